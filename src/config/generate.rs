pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# CDC-FILTER CONFIGURATION
# =============================================================================
# cdc-filter reads change-data-capture records from a source collection,
# extracts the post-change event from each one, keeps the interesting events
# and writes them to a destination collection.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/cdc-filter/config.yml
#   3. /etc/cdc-filter/config.yml

# =============================================================================
# RESOURCES
# =============================================================================
# Named handles to upstream and downstream systems. A 'file' resource is a
# directory; each collection is a newline-delimited JSON file inside it
# (<path>/<collection>.ndjson).

resources:
  mdb:
    type: file
    path: ~/cdc-filter/mdb
  cck:
    type: file
    path: ~/cdc-filter/cck

# =============================================================================
# SOURCE
# =============================================================================
# One CDC envelope per line. Records whose payload carries no 'after'
# document (deletes) produce nothing.

source:
  resource: mdb
  collection: events

# =============================================================================
# DESTINATION
# =============================================================================
# Each interesting event is written keyed by user_id and stamped with its
# updated_at time. 'config' entries are passed to the resource on write.

destination:
  resource: cck
  collection: interesting_events
  config:
    - key: conduit
      value: "true"
    - key: topic
      value: interesting_events

# =============================================================================
# FILTER
# =============================================================================
# predicate.kind:
#   vip       events of VIP users (default)
#   activity  events whose activity is listed under 'activities'
#   all       every decodable event
#
# on_decode_error:
#   skip      log and drop malformed records, keep processing (default)
#   fail      abort the batch on the first malformed record

filter:
  predicate:
    kind: vip
  on_decode_error: skip
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse::parse_config;
    use crate::config::types::PredicateConfig;

    #[test]
    fn test_starter_config_parses() {
        let config = parse_config(&generate_starter_config()).unwrap();

        assert_eq!(config.resources.len(), 2);
        assert_eq!(config.source.collection, "events");
        assert_eq!(config.destination.collection, "interesting_events");
        assert_eq!(config.destination.config.len(), 2);
        assert_eq!(config.filter.predicate, PredicateConfig::Vip);
    }
}
