use crate::{logging, utils, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_RESET_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `BreakerConfig` carries the tuning knobs of a circuit breaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Number of cumulative failures in Closed state that trips the
    /// breaker to Open.
    pub failure_threshold: u32,
    /// Seconds the breaker stays Open before the next availability check
    /// transforms it to HalfOpen for a trial request.
    pub reset_timeout_secs: u64,
    /// Configuration file handed to the logger when the `logger_log4rs`
    /// feature is enabled.
    pub log_config_file: Option<String>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_secs: DEFAULT_RESET_TIMEOUT_SECS,
            log_config_file: None,
        }
    }
}

impl BreakerConfig {
    pub fn check(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            return Err(Error::msg("invalid failure_threshold, must be positive"));
        }
        if self.reset_timeout_secs == 0 {
            return Err(Error::msg("invalid reset_timeout_secs, must be positive"));
        }
        Ok(())
    }

    /// Loads a config from the YAML file under the provided path.
    pub fn from_yaml_file(path_str: &str) -> Result<Self> {
        let path = Path::new(path_str);
        if !path.exists() {
            return Err(Error::msg(format!(
                "breaker YAML configuration file does not exist: {}",
                path_str
            )));
        }
        let mut file = File::open(path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        let config: BreakerConfig = if utils::is_blank(&content) {
            BreakerConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        config.check()?;
        logging::info!(
            "[Config] Resolving breaker config from file, file {}",
            path_str
        );
        Ok(config)
    }
}

/// Loads configuration from a YAML file and initializes the logging
/// module when a logger feature is enabled.
pub fn init_config_with_yaml(config_path: &str) -> Result<BreakerConfig> {
    let config = BreakerConfig::from_yaml_file(config_path)?;
    #[cfg(any(feature = "logger_env", feature = "logger_log4rs"))]
    logging::logger_init(config.log_config_file.clone());
    Ok(config)
}
