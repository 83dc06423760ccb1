//! Application configuration.
//!
//! Layered lowest-precedence first: built-in defaults, an optional TOML
//! file, `HEALTHPORTAL_*` environment variables, then CLI flags (applied by
//! the binary through `AppConfig::apply_overrides`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Application-level constants
pub const APP_NAME: &str = "HealthPortal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

const ENV_PREFIX: &str = "HEALTHPORTAL_";

/// Get the application data directory.
/// ~/HealthPortal/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("healthportal.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "healthportal=info,tower_http=warn".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("Configuration validation failed: {0}")]
    Invalid(String),
}

/// Which backend holds the entity tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageConfig {
    /// Volatile, process-lifetime maps.
    #[default]
    Memory,
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageConfig::Memory,
            log_filter: default_log_filter(),
        }
    }
}

/// On-disk shape; every key optional so files can be partial.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    server: Option<ServerSection>,
    storage: Option<StorageSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageSection {
    backend: Option<String>,
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    filter: Option<String>,
}

/// Explicit overrides, typically from CLI flags. `None` leaves a value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub storage: Option<String>,
    pub database: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.merge_file(path)?;
        }
        config.apply_overrides(Overrides::from_env(|key| std::env::var(key).ok())?)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = parse_file(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let server = file.server.unwrap_or_default();
        let storage = file.storage.unwrap_or_default();
        if server.port == Some(0) {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        self.apply_overrides(Overrides {
            host: server.host,
            port: server.port,
            storage: storage.backend,
            database: storage.path,
            log_filter: file.logging.and_then(|l| l.filter),
        })
    }

    /// Apply one layer of overrides on top of the current values.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(filter) = overrides.log_filter {
            self.log_filter = filter;
        }

        let current_path = match &self.storage {
            StorageConfig::Sqlite { path } => Some(path.clone()),
            StorageConfig::Memory => None,
        };
        match overrides.storage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None => {
                // A database path alone implies the SQLite backend.
                if let Some(path) = overrides.database {
                    self.storage = StorageConfig::Sqlite { path };
                }
            }
            Some("memory") => self.storage = StorageConfig::Memory,
            Some("sqlite") => {
                let path = overrides
                    .database
                    .or(current_path)
                    .unwrap_or_else(default_database_path);
                self.storage = StorageConfig::Sqlite { path };
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "storage".into(),
                    value: other.to_string(),
                })
            }
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if let StorageConfig::Sqlite { path } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "sqlite storage requires a database path".into(),
                ));
            }
        }
        Ok(())
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_file(contents: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(contents)
}

impl Overrides {
    /// Read `HEALTHPORTAL_*` variables through `lookup`.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty())
        };
        let port = match var("PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: format!("{ENV_PREFIX}PORT"),
                    value: raw.clone(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            host: var("HOST"),
            port,
            storage: var("STORAGE"),
            database: var("DATABASE").map(PathBuf::from),
            log_filter: var("LOG"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("HealthPortal"));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn defaults_are_local_memory() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn env_overrides_apply() {
        let overrides = Overrides::from_env(env(&[
            ("HEALTHPORTAL_PORT", "8080"),
            ("HEALTHPORTAL_STORAGE", "sqlite"),
            ("HEALTHPORTAL_DATABASE", "/tmp/portal.db"),
        ]))
        .unwrap();

        let mut config = AppConfig::default();
        config.apply_overrides(overrides).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/tmp/portal.db")
            }
        );
    }

    #[test]
    fn bad_env_port_is_rejected() {
        let result = Overrides::from_env(env(&[("HEALTHPORTAL_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(Overrides {
            storage: Some("postgres".into()),
            ..Overrides::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn database_path_alone_selects_sqlite() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(Overrides {
                database: Some(PathBuf::from("data/portal.db")),
                ..Overrides::default()
            })
            .unwrap();
        assert!(matches!(config.storage, StorageConfig::Sqlite { .. }));
    }

    #[test]
    fn toml_file_layer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("healthportal.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 7000

[storage]
backend = "sqlite"
path = "portal.db"

[logging]
filter = "healthportal=debug"
"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.merge_file(&path).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:7000");
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("portal.db")
            }
        );
        assert_eq!(config.log_filter, "healthportal=debug");
    }

    #[test]
    fn toml_unknown_key_and_zero_port_fail() {
        assert!(parse_file("[server]\nbind = \"x\"").is_err());

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("zero.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        let mut config = AppConfig::default();
        assert!(matches!(config.merge_file(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
