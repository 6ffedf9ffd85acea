use std::num::ParseIntError;

use thiserror::Error;

/// Default StatsD host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default StatsD port.
pub const DEFAULT_PORT: u16 = 8125;

/// Environment variable holding the StatsD host.
pub const HOST_ENV_VAR: &str = "STATSD_HOST";

/// Environment variable holding the StatsD port.
pub const PORT_ENV_VAR: &str = "STATSD_PORT";

/// Errors that could occur while loading settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The configured port was not a valid UDP port.
    #[error("invalid port '{value}': {reason}")]
    InvalidPort {
        /// The raw configured value.
        value: String,

        /// Details about the parsing failure.
        #[source]
        reason: ParseIntError,
    },
}

/// Location of the StatsD server.
///
/// Settings are only ever read when asked for. A client is handed its settings explicitly, through
/// [`StatsdBuilder::with_settings`][crate::StatsdBuilder::with_settings], and never looks them up on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsdSettings {
    /// Hostname or IP address of the StatsD server.
    pub host: String,

    /// UDP port of the StatsD server.
    pub port: u16,
}

impl StatsdSettings {
    /// Loads settings from the `STATSD_HOST` and `STATSD_PORT` environment variables.
    ///
    /// Missing variables fall back to the defaults of `127.0.0.1` and `8125`.
    ///
    /// # Errors
    ///
    /// If `STATSD_PORT` is set but is not a valid port number, an error will be returned.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings using the given lookup function in place of the environment.
    ///
    /// Values are trimmed, and empty values are treated as missing.
    ///
    /// # Errors
    ///
    /// If the port is set but is not a valid port number, an error will be returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get(HOST_ENV_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV_VAR) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|reason| SettingsError::InvalidPort { value, reason })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }
}

impl Default for StatsdSettings {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{SettingsError, StatsdSettings};

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = StatsdSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, StatsdSettings::default());
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8125);
    }

    #[test]
    fn reads_host_and_port() {
        let settings = StatsdSettings::from_lookup(lookup_from(&[
            ("STATSD_HOST", "stats.internal"),
            ("STATSD_PORT", " 9125 "),
        ]))
        .unwrap();
        assert_eq!(settings, StatsdSettings { host: "stats.internal".to_string(), port: 9125 });
    }

    #[test]
    fn empty_values_fall_back() {
        let settings =
            StatsdSettings::from_lookup(lookup_from(&[("STATSD_HOST", ""), ("STATSD_PORT", "  ")]))
                .unwrap();
        assert_eq!(settings, StatsdSettings::default());
    }

    #[test]
    fn rejects_invalid_port() {
        for value in ["eighty", "70000", "-1"] {
            let err = StatsdSettings::from_lookup(lookup_from(&[("STATSD_PORT", value)])).unwrap_err();
            assert!(matches!(err, SettingsError::InvalidPort { value: ref v, .. } if v == value));
        }
    }
}
