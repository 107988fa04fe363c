pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use parse::{load_config, ConfigError};
pub use types::{Config, DecodeErrorStrategy, FilterConfig, PredicateConfig};

const USER_CONFIG: &str = ".config/cdc-filter/config.yml";
const SYSTEM_CONFIG: &str = "/etc/cdc-filter/config.yml";

/// Matches `$env{VAR_NAME}`.
pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Expands `$env{VAR_NAME}` references in a string.
/// Unset variables are left in place so validation can report them.
pub fn expand_env_vars(text: &str) -> String {
    env_var_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(home_dir) = dirs::home_dir() else {
        return path.to_path_buf();
    };

    if path == Path::new("~") {
        return home_dir;
    }
    match path.strip_prefix("~") {
        Ok(rest) => home_dir.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolves the config file path: the explicit argument if given, otherwise
/// the first of `~/.config/cdc-filter/config.yml` and
/// `/etc/cdc-filter/config.yml` that exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    if let Some(home_dir) = dirs::home_dir() {
        let user_config = home_dir.join(USER_CONFIG);
        if user_config.exists() {
            return Some(user_config);
        }
    }

    let system_config = PathBuf::from(SYSTEM_CONFIG);
    if system_config.exists() {
        return Some(system_config);
    }

    None
}
