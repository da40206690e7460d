//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load and validate configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load_default() -> Option<Result<Config, ConfigError>> {
        Self::default_paths()
            .into_iter()
            .find(|path| path.exists())
            .map(|path| {
                log::info!("Loading config from {}", path.display());
                Self::load(&path)
            })
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/fanctl/config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fanctl").join("config.toml"));
        }

        paths.push(PathBuf::from("fanctl.toml"));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_paths_not_empty() {
        let paths = ConfigFile::default_paths();
        assert_eq!(paths[0], PathBuf::from("/etc/fanctl/config.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\nsleeptime_seconds = 3\n\n[fan]\ntype = \"hwmon\"\npath = \"/sys/pwm1\""
        )
        .unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.general.sleeptime_seconds, 3);
        assert!(config.fan.is_some());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nsleeptime_seconds = 0").unwrap();

        let result = ConfigFile::load(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_binding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[sensors]]\ntype = \"lm_sensors\"\npath = \"/x\"").unwrap();

        let result = ConfigFile::load(file.path());
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }
}
