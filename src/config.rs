//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Which backend holds the todo collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Flat JSON file, rewritten on every mutation.
    File,
    /// Process-local list, lost on restart.
    Memory,
}

impl std::str::FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                key: "TODO_API_STORAGE".into(),
                message: format!("expected `file` or `memory`, got `{other}`"),
            }),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                 | Default      |
/// |-------------------------|--------------|
/// | `TODO_API_HOST`         | `0.0.0.0`    |
/// | `TODO_API_PORT`         | `8000`       |
/// | `TODO_API_STORAGE`      | `file`       |
/// | `TODO_API_DATA_PATH`    | `todos.json` |
/// | `TODO_API_STATIC_DIR`   | `.`          |
/// | `TODO_API_INDEX`        | `index.html` |
/// | `TODO_API_CORS_ORIGINS` | any origin   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    /// JSON file used by the file backend.
    pub data_path: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// File name (relative to `static_dir`) served at `/`.
    pub index_file: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            storage: StorageKind::File,
            data_path: PathBuf::from("todos.json"),
            static_dir: PathBuf::from("."),
            index_file: "index.html".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to [`ServerConfig::default`]; set but unparsable
    /// values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("TODO_API_HOST").unwrap_or(defaults.host);

        let port = match lookup("TODO_API_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "TODO_API_PORT".into(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let storage = match lookup("TODO_API_STORAGE") {
            Some(raw) => raw.parse()?,
            None => defaults.storage,
        };

        let data_path = lookup("TODO_API_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let static_dir = lookup("TODO_API_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let index_file = lookup("TODO_API_INDEX").unwrap_or(defaults.index_file);

        let cors_origins: Vec<String> = lookup("TODO_API_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            storage,
            data_path,
            static_dir,
            index_file,
            cors_origins,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.data_path, PathBuf::from("todos.json"));
        assert_eq!(config.index_file, "index.html");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("TODO_API_PORT", "9001"),
            ("TODO_API_STORAGE", "memory"),
            ("TODO_API_DATA_PATH", "/tmp/data.json"),
            ("TODO_API_CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.data_path, PathBuf::from("/tmp/data.json"));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("TODO_API_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("TODO_API_PORT"));
    }

    #[test]
    fn unknown_storage_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("TODO_API_STORAGE", "sqlite")]))
            .unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }
}
