//! Configuration for the kanban service.
//!
//! Settings are read from `.kanban/kanban.toml` (or the `--config` path),
//! then overridden by environment variables, then by CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 4000
//! cors_permissive = false
//!
//! [database]
//! path = ".kanban/kanban.db"
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```
//!
//! # Environment Overrides
//!
//! | Variable         | Overrides        |
//! |------------------|------------------|
//! | `KANBAN_HOST`    | `server.host`    |
//! | `KANBAN_PORT`    | `server.port`    |
//! | `KANBAN_DB_PATH` | `database.path`  |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::board::ServerConfig;

pub const DEFAULT_CONFIG_PATH: &str = ".kanban/kanban.toml";

pub const ENV_HOST: &str = "KANBAN_HOST";
pub const ENV_PORT: &str = "KANBAN_PORT";
pub const ENV_DB_PATH: &str = "KANBAN_DB_PATH";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: compact, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow any origin. Meant for local front-end development.
    #[serde(default)]
    pub cors_permissive: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".kanban/kanban.db")
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// An `EnvFilter` directive. `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// The complete kanban.toml structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KanbanToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl KanbanToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kanban.toml")
    }

    /// Load the file if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating its directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize kanban.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `KANBAN_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database.path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            db_path: self.database.path.clone(),
            cors_permissive: self.server.cors_permissive,
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.host.trim().is_empty() {
            warnings.push("server.host is empty".to_string());
        }
        if self.server.port == 0 {
            warnings.push("server.port is 0; the OS will pick a random port".to_string());
        }
        if self.database.path.as_os_str().is_empty() {
            warnings.push("database.path is empty".to_string());
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            warnings.push(format!(
                "Invalid logging.level '{}': {}",
                self.logging.level, e
            ));
        }

        warnings
    }
}

/// Resolve the config file path: explicit flag first, then the default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_display_and_parse() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        let err = "pretty".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_defaults() {
        let config = KanbanToml::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert!(!config.server.cors_permissive);
        assert_eq!(config.database.path, PathBuf::from(".kanban/kanban.db"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_full() {
        let config = KanbanToml::parse(
            r#"
[server]
host = "0.0.0.0"
port = 8080
cors_permissive = true

[database]
path = "/var/lib/kanban/board.db"

[logging]
level = "kanban=debug,tower_http=info"
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.cors_permissive);
        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/kanban/board.db")
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_uses_defaults() {
        let config = KanbanToml::parse("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database, DatabaseSection::default());
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn test_parse_invalid() {
        let err = KanbanToml::parse("[server]\nport = \"not a number\"").unwrap_err();
        assert!(err.to_string().contains("kanban.toml"));
        assert!(KanbanToml::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("kanban.toml");

        let mut config = KanbanToml::default();
        config.server.port = 5050;
        config.logging.format = LogFormat::Json;
        config.save(&path).unwrap();

        let loaded = KanbanToml::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = KanbanToml::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, KanbanToml::default());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempdir().unwrap();
        let err = KanbanToml::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = KanbanToml::default();
        config
            .apply_env_overrides_from(lookup(&[
                (ENV_HOST, "0.0.0.0"),
                (ENV_PORT, "7000"),
                (ENV_DB_PATH, "/tmp/board.db"),
            ]))
            .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/board.db"));
    }

    #[test]
    fn test_env_overrides_absent_keep_file_values() {
        let mut config = KanbanToml::parse("[server]\nport = 1234\n").unwrap();
        config.apply_env_overrides_from(lookup(&[])).unwrap();
        assert_eq!(config.server.port, 1234);
    }

    #[test]
    fn test_env_override_bad_port() {
        let mut config = KanbanToml::default();
        let err = config
            .apply_env_overrides_from(lookup(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = KanbanToml::default();
        assert!(config.validate().is_empty());

        config.server.host = " ".into();
        config.server.port = 0;
        config.database.path = PathBuf::new();
        config.logging.level = "kanban=notalevel".into();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 4, "{:?}", warnings);
    }

    #[test]
    fn test_server_config_mapping() {
        let mut config = KanbanToml::default();
        config.server.cors_permissive = true;
        let server = config.server_config();
        assert_eq!(server.addr(), "127.0.0.1:4000");
        assert_eq!(server.db_path, config.database.path);
        assert!(server.cors_permissive);
    }

    #[test]
    fn test_config_path_resolution() {
        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            config_path(Some(Path::new("/etc/kanban.toml"))),
            PathBuf::from("/etc/kanban.toml")
        );
    }
}
