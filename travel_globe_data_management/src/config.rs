use std::{env, time::Duration};

use crate::DataManagerError;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_DELAY_MS: u64 = 1200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("travel-globe-csv-import/", env!("CARGO_PKG_VERSION"));

pub const ENDPOINT_VAR: &str = "GEOCODER_ENDPOINT";
pub const DELAY_VAR: &str = "GEOCODER_DELAY_MS";
pub const USER_AGENT_VAR: &str = "GEOCODER_USER_AGENT";
pub const TIMEOUT_VAR: &str = "GEOCODER_TIMEOUT_SECS";

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Search endpoint, queried with `format=json&limit=1&q=<place>`.
    pub endpoint: String,
    /// Minimum spacing between external lookups.
    pub delay: Duration,
    /// Sent as `User-Agent` with every lookup.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ImportConfig {
    pub fn from_env() -> Result<Self, DataManagerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source, unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DataManagerError> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        if let Some(delay) = lookup(DELAY_VAR) {
            config.delay = Duration::from_millis(parse_number(DELAY_VAR, &delay)?);
        }
        if let Some(user_agent) = lookup(USER_AGENT_VAR) {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            config.timeout = Duration::from_secs(parse_number(TIMEOUT_VAR, &timeout)?);
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, DataManagerError> {
    value
        .trim()
        .parse()
        .map_err(|err| DataManagerError::Config(format!("invalid {key} {value:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ImportConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ImportConfig::default());
        assert_eq!(config.delay, Duration::from_millis(1200));
        assert!(config.user_agent.starts_with("travel-globe-csv-import/"));
    }

    #[test]
    fn overrides() {
        let config = ImportConfig::from_lookup(lookup(&[
            (ENDPOINT_VAR, "http://localhost:8080/search"),
            (DELAY_VAR, "0"),
            (USER_AGENT_VAR, "me@example.org"),
            (TIMEOUT_VAR, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/search");
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.user_agent, "me@example.org");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = ImportConfig::from_lookup(lookup(&[(DELAY_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, DataManagerError::Config(message) if message.contains(DELAY_VAR)));
    }
}
