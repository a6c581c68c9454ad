use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_INTERVAL_SECS: u64 = 5;
const DEFAULT_LOG_FILE: &str = "mouse_activity_log.csv";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_interval_secs: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_interval_secs: DEFAULT_INTERVAL_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try to load from file first
        let mut config = match Self::config_path() {
            Some(config_path) if config_path.exists() => {
                let config_str = std::fs::read_to_string(&config_path)
                    .context("Failed to read config file")?;
                Self::from_yaml(&config_str)?
            }
            _ => Config::default(),
        };

        config.apply_overrides(
            env::var("MOUSE_LOG_INTERVAL").ok(),
            env::var("MOUSE_LOG_FILE").ok(),
        )?;
        config.validate()?;

        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    fn from_yaml(config_str: &str) -> Result<Self> {
        serde_yaml::from_str(config_str).context("Failed to parse config file")
    }

    fn apply_overrides(
        &mut self,
        interval: Option<String>,
        log_file: Option<String>,
    ) -> Result<()> {
        if let Some(interval) = interval {
            self.log_interval_secs = interval
                .trim()
                .parse()
                .with_context(|| format!("Invalid MOUSE_LOG_INTERVAL value: {:?}", interval))?;
        }

        if let Some(log_file) = log_file {
            self.log_file = PathBuf::from(log_file);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.log_interval_secs == 0 {
            bail!("Log interval must be at least one second");
        }
        if self.log_file.as_os_str().is_empty() {
            bail!("Log file path must not be empty");
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mouse-activity-logger", "logger")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.log_interval_secs)
    }
}
