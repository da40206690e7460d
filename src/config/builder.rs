//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file, or from the default locations
    ///
    /// An explicitly named file must exist; missing default files are fine.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default().transpose()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI dry-run flag
    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        if let Some(d) = dry_run {
            self.config.general.dry_run = d;
        }
        self
    }

    /// Override with CLI polling period
    pub fn with_sleeptime(mut self, seconds: Option<u64>) -> Self {
        if let Some(s) = seconds {
            self.config.general.sleeptime_seconds = s;
        }
        self
    }

    /// Override with CLI depulse duration
    pub fn with_depulse(mut self, seconds: Option<f32>) -> Self {
        if let Some(d) = seconds {
            self.config.general.depulse_seconds = d;
        }
        self
    }

    /// Override with CLI do-not-disturb flag for disks
    pub fn with_dnd_disk(mut self, dnd: Option<bool>) -> Self {
        if let Some(d) = dnd {
            self.config.general.dnd_disk = d;
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
