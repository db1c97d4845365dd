use std::{fs, path::Path};

use axum::http::HeaderValue;
use serde::Deserialize;

/// Path of the server's configuration file, relative to the working
/// directory.
pub const CONFIG_PATH: &str = "ad_board_server.json";

/// Validated server configuration. Immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Path of the SQLite database file.
    pub db_path: String,
    /// Origin allowed to read the board from a browser, if any.
    pub allowed_origin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read the config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid allowed origin: {0:?}")]
    BadOrigin(String),
}

impl ServerConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(&fs::read_to_string(path)?)?;

        if let Some(origin) = &config.allowed_origin {
            if origin.parse::<HeaderValue>().is_err() {
                return Err(ConfigError::BadOrigin(origin.clone()));
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn write_config(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ad_board_server.json");
        fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_a_full_config() {
        let (_dir, path) = write_config(
            r#"{
                "bind_addr": "0.0.0.0:8080",
                "db_path": "ads.sqlite",
                "allowed_origin": "https://board.example.com"
            }"#,
        );

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.db_path, "ads.sqlite");
        assert_eq!(
            config.allowed_origin.as_deref(),
            Some("https://board.example.com")
        );
    }

    #[test]
    fn origin_is_optional() {
        let (_dir, path) = write_config(
            r#"{ "bind_addr": "127.0.0.1:8080", "db_path": "ads.sqlite" }"#,
        );
        assert!(ServerConfig::load(&path).unwrap().allowed_origin.is_none());
    }

    #[test]
    fn rejects_unusable_origins() {
        let (_dir, path) = write_config(
            r#"{
                "bind_addr": "127.0.0.1:8080",
                "db_path": "ads.sqlite",
                "allowed_origin": "newlines\nare not a header value"
            }"#,
        );
        assert!(matches!(
            ServerConfig::load(&path),
            Err(ConfigError::BadOrigin(_))
        ));
    }
}
