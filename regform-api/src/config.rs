use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://viacep.com.br/ws".to_string(),
        }
    }
}

/// Host environment the exported document is written for
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    /// Desktop: user's downloads folder, copy in documents
    #[default]
    Downloads,
    /// Mobile shell: the application's own storage directory
    AppStorage,
    /// Web: kept in memory until the browser downloads it
    Browser,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub target: ExportTarget,
    /// Overrides the primary directory for file targets
    pub output_dir: Option<PathBuf>,
    /// Overrides the best-effort secondary directory (desktop only)
    pub secondary_dir: Option<PathBuf>,
    /// chrono format for the "generated at" line
    pub timestamp_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target: ExportTarget::default(),
            output_dir: None,
            secondary_dir: None,
            timestamp_format: "%d/%m/%Y, %H:%M:%S".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub probe_url: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://www.google.com/favicon.ico".to_string(),
            interval_secs: 5,
            timeout_secs: 3,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, writing one on first run.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        Self::load_from(&get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<(Self, PathBuf), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            let default_config = toml::to_string_pretty(&AppConfig::default()).map_err(|e| {
                ConfigError::Message(format!("Failed to serialize default config: {e}"))
            })?;
            std::fs::write(config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .build()?;

        let config: AppConfig = builder.try_deserialize()?;

        Ok((config, config_path.to_path_buf()))
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("regform").join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let (config, loaded_from) = AppConfig::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(loaded_from, path);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.lookup.base_url, "https://viacep.com.br/ws");
        assert_eq!(config.export.target, ExportTarget::Downloads);
        assert_eq!(config.connectivity.timeout_secs, 3);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[export]
target = "browser"
timestamp_format = "%Y-%m-%d %H:%M"

[lookup]
base_url = "http://127.0.0.1:9999/ws"
"#,
        )
        .unwrap();

        let (config, _) = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.export.target, ExportTarget::Browser);
        assert_eq!(config.export.timestamp_format, "%Y-%m-%d %H:%M");
        assert!(config.export.output_dir.is_none());
        assert_eq!(config.lookup.base_url, "http://127.0.0.1:9999/ws");
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.cors.is_none());
    }
}
