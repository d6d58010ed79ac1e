use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service configuration (~/.config/growers-gate/config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://gate.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,

    /// Only honoured with explicit origins
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Message prefixes whose remainder is redacted as a `key=value` list
    #[serde(default = "default_structured_prefixes")]
    pub structured_prefixes: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: default_allow_origins(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            structured_prefixes: default_structured_prefixes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> u32 {
    5
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allow_credentials() -> bool {
    true
}

fn default_structured_prefixes() -> Vec<String> {
    vec!["Test exception with mixed data:".to_string()]
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|origin| origin == "*")
    }
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, config.to_toml()?)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "growers-gate", "growers-gate") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.growers-gate/config.toml")
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.connect_timeout_ms, 5000);
        assert!(config.database.url.is_none());
        assert!(config.cors.allows_any_origin());
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(
            parsed.redaction.structured_prefixes,
            config.redaction.structured_prefixes
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "sqlite://gate.db"

            [cors]
            allow_origins = ["https://growersgate.example"]
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("sqlite://gate.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.cors.allows_any_origin());
        assert!(config.cors.allow_credentials);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join(format!("gate-config-{}.toml", uuid::Uuid::new_v4()));
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gate-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9100);

        std::fs::remove_file(&path).unwrap();
    }
}
