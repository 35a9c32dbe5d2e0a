//! Configuration management for the server.

use stacks_engine::Policy;
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Days a book may be kept before it is overdue
    pub loan_period_days: i64,
    /// Confirmed reservations a member may hold at once
    pub reservation_limit: usize,
    /// Stock the catalog with the sample books at startup
    pub seed_sample_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Policy::default();

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let loan_period_days = match lookup("LOAN_PERIOD_DAYS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|days: &i64| *days > 0)
                .ok_or(ConfigError::InvalidLoanPeriod)?,
            None => defaults.loan_period_days,
        };

        let reservation_limit = match lookup("RESERVATION_LIMIT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidReservationLimit)?,
            None => defaults.reservation_limit,
        };

        let seed_sample_data = match lookup("SEED_SAMPLE_DATA").as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(_) => return Err(ConfigError::InvalidSeedFlag),
        };

        Ok(Self {
            host,
            port,
            loan_period_days,
            reservation_limit,
            seed_sample_data,
        })
    }

    /// Engine policy derived from this configuration.
    pub fn policy(&self) -> Policy {
        Policy {
            loan_period_days: self.loan_period_days,
            reservation_limit: self.reservation_limit,
            ..Policy::default()
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("LOAN_PERIOD_DAYS must be a positive number of days")]
    InvalidLoanPeriod,

    #[error("Invalid RESERVATION_LIMIT value")]
    InvalidReservationLimit,

    #[error("SEED_SAMPLE_DATA must be true or false")]
    InvalidSeedFlag,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.seed_sample_data);
        assert_eq!(config.policy(), Policy::default());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "9100"),
            ("LOAN_PERIOD_DAYS", "21"),
            ("RESERVATION_LIMIT", "5"),
            ("SEED_SAMPLE_DATA", "false"),
        ])
        .unwrap();
        assert_eq!(config.port, 9100);
        assert!(!config.seed_sample_data);

        let policy = config.policy();
        assert_eq!(policy.loan_period_days, 21);
        assert_eq!(policy.reservation_limit, 5);
        assert_eq!(policy.queue_slot_days, 7);
    }

    #[test]
    fn invalid_values() {
        assert!(matches!(load(&[("PORT", "http")]), Err(ConfigError::InvalidPort)));
        assert!(matches!(
            load(&[("LOAN_PERIOD_DAYS", "0")]),
            Err(ConfigError::InvalidLoanPeriod)
        ));
        assert!(matches!(
            load(&[("RESERVATION_LIMIT", "-1")]),
            Err(ConfigError::InvalidReservationLimit)
        ));
        assert!(matches!(
            load(&[("SEED_SAMPLE_DATA", "maybe")]),
            Err(ConfigError::InvalidSeedFlag)
        ));
    }
}
