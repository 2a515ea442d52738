use std::{env, fmt, path::PathBuf, time::Duration};

use crate::use_cases::ReconnectPolicy;

// Runtime/client constants (not gameplay tuning).

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8765";

pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;
pub const INBOUND_CHANNEL_CAPACITY: usize = 256;
pub const KEY_CHANNEL_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub reconnect: ReconnectPolicy,
    pub demo_fallback_delay: Duration,
    pub idle_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let millis = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            parse_or(&lookup, key, default).map(Duration::from_millis)
        };

        let delay = millis("RECONNECT_DELAY_MS", 3000)?;
        let reconnect = match lookup("RECONNECT_POLICY").as_deref() {
            None | Some("backoff") => ReconnectPolicy::Backoff {
                base: delay,
                max_delay: millis("RECONNECT_MAX_DELAY_MS", 30_000)?,
                max_attempts: parse_or(&lookup, "RECONNECT_MAX_ATTEMPTS", 10)?,
            },
            Some("fixed") => ReconnectPolicy::Fixed { delay },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RECONNECT_POLICY",
                    value: other.to_string(),
                });
            }
        };

        let idle_timeout = millis("IDLE_TIMEOUT_MS", 10_000)?;
        // Zero would close every socket before its first frame.
        if idle_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "IDLE_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            server_url: lookup("ARCADE_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            reconnect,
            demo_fallback_delay: millis("DEMO_FALLBACK_DELAY_MS", 2000)?,
            idle_timeout,
            log_file: lookup("LOG_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn when_nothing_is_set_then_defaults_apply() {
        let config = config(&[]).expect("defaults");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.reconnect, ReconnectPolicy::default());
        assert_eq!(config.demo_fallback_delay, Duration::from_millis(2000));
        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn when_fixed_policy_is_chosen_then_delay_is_used_as_is() {
        let config = config(&[("RECONNECT_POLICY", "fixed"), ("RECONNECT_DELAY_MS", "500")])
            .expect("fixed policy");
        assert_eq!(
            config.reconnect,
            ReconnectPolicy::Fixed {
                delay: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn when_value_does_not_parse_then_key_is_named() {
        let err = config(&[("IDLE_TIMEOUT_MS", "soon")]).expect_err("bad number");
        assert!(err.to_string().contains("IDLE_TIMEOUT_MS"));

        let err = config(&[("RECONNECT_POLICY", "linear")]).expect_err("bad policy");
        assert!(err.to_string().contains("RECONNECT_POLICY"));
    }

    #[test]
    fn when_idle_timeout_is_zero_then_config_is_rejected() {
        let err = config(&[("IDLE_TIMEOUT_MS", "0")]).expect_err("zero timeout");
        assert!(err.to_string().contains("IDLE_TIMEOUT_MS"));

        let config = config(&[("IDLE_TIMEOUT_MS", "1")]).expect("one millisecond");
        assert_eq!(config.idle_timeout, Duration::from_millis(1));
    }
}
