//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use jits::{JitsError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for JitsError {
    fn from(err: ConfigError) -> Self {
        JitsError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (jits/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or fails validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, JitsError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("jits/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "jits", "jits") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, JitsError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .layout()
        .validate()
        .map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use jits::config::PositioningPolicy;
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_load_explicit_config() {
        let file = config_file(
            r##"
            [layout]
            horizontal_spacing = 200.0
            positioning = "preserve-manual"

            [style]
            edge_color = "#000000"
            "##,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().horizontal_spacing(), 200.0);
        assert_eq!(config.layout().vertical_spacing(), 120.0);
        assert_eq!(
            config.layout().positioning(),
            PositioningPolicy::PreserveManual
        );
        assert!(config.style().edge_color().is_ok());
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, JitsError::Config(msg) if msg.contains("Missing configuration")));
    }

    #[test]
    fn test_invalid_toml() {
        let file = config_file("[layout\nhorizontal_spacing = ");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, JitsError::Config(msg) if msg.contains("Failed to parse")));
    }

    #[test]
    fn test_invalid_layout_values() {
        let file = config_file("[layout]\nvertical_spacing = -1.0\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, JitsError::Config(msg) if msg.contains("Validation error")));
    }
}
