//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use crate::api::ApiConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8083;

/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite file (from NOTES_DB_PATH). `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    /// Bind host (from NOTES_HOST)
    pub host: String,
    /// Bind port (from NOTES_PORT)
    pub port: u16,
    /// Allowed CORS origins (from NOTES_CORS_ORIGINS, comma-separated)
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("NOTES_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let host = lookup("NOTES_HOST")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("NOTES_PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("Invalid NOTES_PORT {:?}, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let cors_origins = lookup("NOTES_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            db_path,
            host,
            port,
            cors_origins,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn api(&self) -> ApiConfig {
        ApiConfig {
            cors_origins: self.cors_origins.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert!(config.db_path.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:8083");
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("NOTES_DB_PATH", "/tmp/notes.db"),
            ("NOTES_HOST", "127.0.0.1"),
            ("NOTES_PORT", "9000"),
            ("NOTES_CORS_ORIGINS", "http://a.test, http://b.test"),
        ]);

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let config = config_from(&[("NOTES_PORT", "not-a-port")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn blank_db_path_is_ignored() {
        let config = config_from(&[("NOTES_DB_PATH", "  ")]);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn api_config_carries_cors_origins() {
        let config = config_from(&[("NOTES_CORS_ORIGINS", "http://a.test")]);
        assert_eq!(
            config.api().cors_origins,
            Some(vec!["http://a.test".to_string()])
        );
    }
}
