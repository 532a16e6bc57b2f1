//! Tracing subscriber setup shared by both binaries

use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR_ENV: &str = "LOG_DIR";
pub const LOG_JSON_ENV: &str = "LOG_JSON";

/// Where and how to write logs
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset
    pub default_filter: String,
    pub json: bool,
    /// Daily rolling files go here; stderr when `None`
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
}

impl LogConfig {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            default_filter: "flight_optimizer=info,warn".to_string(),
            json: false,
            log_dir: None,
            file_name: file_name.into(),
        }
    }

    /// `LOG_DIR` and `LOG_JSON` on top of the defaults
    pub fn from_env(file_name: impl Into<String>) -> Self {
        let mut config = Self::new(file_name);
        config.log_dir = std::env::var(LOG_DIR_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        config.json = std::env::var(LOG_JSON_ENV)
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_filter)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match (&config.log_dir, config.json) {
        (Some(log_dir), _) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = tracing_appender::rolling::daily(log_dir, &config.file_name);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()?;
            info!(
                log_dir = %log_dir.display(),
                file = %config.file_name,
                "Logging initialized"
            );
        }
        (None, true) => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .json(),
                )
                .try_init()?;
        }
        (None, false) => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    debug!("Debug logging is enabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::new("flight-optimizer.log");
        assert_eq!(config.file_name, "flight-optimizer.log");
        assert!(config.log_dir.is_none());
        assert!(!config.json);
        assert!(config.default_filter.starts_with("flight_optimizer=info"));
    }

    #[test]
    fn test_init_logging_to_file() {
        let log_dir = std::env::temp_dir()
            .join(format!("flight-optimizer-logs-{}", std::process::id()));
        let config = LogConfig {
            log_dir: Some(log_dir.clone()),
            ..LogConfig::new("test.log")
        };

        assert!(init_logging(&config).is_ok());
        assert!(log_dir.is_dir());
        // A second global subscriber is refused
        assert!(init_logging(&config).is_err());

        let _ = std::fs::remove_dir_all(&log_dir);
    }
}
