use crate::config::generate::generate_starter_config;
use std::fs;
use std::path::PathBuf;

const USER_CONFIG: &str = ".config/cdc-filter/config.yml";
const SYSTEM_CONFIG: &str = "/etc/cdc-filter/config.yml";

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    // Prefer the per-user location, fall back to the system one
    let config_path = dirs::home_dir()
        .map(|home| home.join(USER_CONFIG))
        .filter(|path| match path.parent() {
            Some(parent) => match fs::create_dir_all(parent) {
                Ok(()) => true,
                Err(_) => {
                    eprintln!("Warning: Could not create directory {}", parent.display());
                    eprintln!("Falling back to {}", SYSTEM_CONFIG);
                    false
                }
            },
            None => false,
        })
        .unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG));

    // Never overwrite an existing config
    if config_path.exists() {
        return Err(format!(
            "config file already exists at {}; remove it first or use --stdout",
            config_path.display()
        )
        .into());
    }

    // Create parent directory for /etc/cdc-filter if needed
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    // Load and validate the config
    crate::config::load_config(&path)?;
    println!("Config is valid");
    Ok(())
}
