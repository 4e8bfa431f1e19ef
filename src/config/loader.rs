//! Configuration Loader
//!
//! Layers defaults, the TOML settings file and `AUTOFULFILL__*` environment
//! overrides with the `config` crate, then validates the result. The
//! settings file is generated with defaults on first run and never
//! overwritten afterwards.

use config::{Config, Environment, File, FileFormat};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::AutofulfillConfig;
use crate::constants::ENV_PREFIX;

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# Autofulfill Configuration File
# This file is auto-generated. You can modify these settings.
# Changes require a restart to take effect.

[autofulfill]
# Enable or disable the autofulfill poller
enabled = true

# Interval in seconds between autofulfill checks (1-3600)
check_time_seconds = 5

# Show in-game messages for autofulfill actions
show_in_game_messages = true

[timing]
# Minimum time after server start before the colony surface is touched
startup_grace_ms = 120000

# Backoff between readiness checks, and after a failed check
readiness_retry_ms = 30000
readiness_error_retry_ms = 60000

# Settling delay before the first scheduled check
initial_poll_delay_ms = 60000

# Session window for statistics and message limits
stats_reset_interval_ms = 300000

# Identical messages allowed per session window
max_messages_per_category = 3

# Offer a stats line every N processed requests
stats_broadcast_every = 10
";

/// Loaded, validated settings plus where they came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AutofulfillConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from `path`, generating a default file there first if absent.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        Self::ensure_config_file(path)?;
        let config = Self::build(Some(path))?;

        info!(
            config_file = %path.display(),
            enabled = config.autofulfill.enabled,
            check_time_seconds = config.autofulfill.check_time_seconds,
            show_in_game_messages = config.autofulfill.show_in_game_messages,
            "Configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            source: Some(path.to_path_buf()),
        }))
    }

    /// Defaults plus environment overrides, no file.
    pub fn from_env() -> ConfigResult<Arc<ConfigManager>> {
        let config = Self::build(None)?;
        Ok(Arc::new(ConfigManager {
            config,
            source: None,
        }))
    }

    pub fn config(&self) -> &AutofulfillConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Write the commented default file if nothing exists at `path`.
    ///
    /// Returns `true` when the file was generated.
    pub fn ensure_config_file(path: &Path) -> ConfigResult<bool> {
        if path.exists() {
            debug!(config_file = %path.display(), "Config file already exists");
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ConfigurationError::file_write_error(parent.display().to_string(), e)
                })?;
            }
        }

        fs::write(path, DEFAULT_CONFIG_TEMPLATE)
            .map_err(|e| ConfigurationError::file_write_error(path.display().to_string(), e))?;

        info!(config_file = %path.display(), "Generated default config file");
        Ok(true)
    }

    fn build(path: Option<&Path>) -> ConfigResult<AutofulfillConfig> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AutofulfillConfig::default())?);

        if let Some(path) = path {
            let contents = fs::read_to_string(path)
                .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;
            builder = builder.add_source(File::from_str(&contents, FileFormat::Toml));
        }

        let config: AutofulfillConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}
