//! Connection configuration for the question store
//!
//! Layering (lowest to highest priority):
//! 1. Built-in defaults (local PostgreSQL)
//! 2. `~/.quizctl/config.toml`, or an explicit path that must exist (`[database]` table)
//! 3. `QUIZCTL_DB_*` environment variables
//!
//! `.env` files are read into the environment first, see [`load_dotenv`].

use std::env;
use std::fmt;
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Default maximum connections for the pool.
/// Kept low for single-user tooling.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const ENV_HOST: &str = "QUIZCTL_DB_HOST";
const ENV_PORT: &str = "QUIZCTL_DB_PORT";
const ENV_NAME: &str = "QUIZCTL_DB_NAME";
const ENV_USER: &str = "QUIZCTL_DB_USER";
const ENV_PASSWORD: &str = "QUIZCTL_DB_PASSWORD";
const ENV_MAX_CONNECTIONS: &str = "QUIZCTL_DB_MAX_CONNECTIONS";

/// Static parameters for reaching the store.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

// Hand-written so the password never lands in logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: Option<DatabaseConfig>,
}

impl DatabaseConfig {
    /// Load from the default config file (if present) and the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        debug!("No config file at {}, using defaults", path.display());
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Load from an explicit `path` and apply environment overrides.
    ///
    /// Fails if the file does not exist: a path the user named is never
    /// silently replaced by defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config not found at {:?}", path);
        }

        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        debug!("Loaded database config from {}", path.display());

        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse the `[database]` table of a TOML document.
    ///
    /// Missing keys fall back to defaults; a missing table yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file (invalid TOML)")?;
        let config = file.database.unwrap_or_default();
        if config.max_connections == 0 {
            bail!("database.max_connections must be a positive integer, got 0");
        }
        Ok(config)
    }

    /// Get config file path: ~/.quizctl/config.toml
    pub fn config_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from(".quizctl"))
            .join("config.toml")
    }

    /// Apply `QUIZCTL_DB_*` overrides read through `lookup`.
    ///
    /// Taking a lookup function keeps tests independent of process env.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .context(format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
        }
        if let Some(database) = lookup(ENV_NAME) {
            self.database = database;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.user = user;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            let parsed: NonZeroU32 = max.trim().parse().context(format!(
                "{} must be a positive integer, got '{}'",
                ENV_MAX_CONNECTIONS, max
            ))?;
            self.max_connections = parsed.get();
        }
        Ok(())
    }
}

/// Get the quizctl config directory path (~/.quizctl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quizctl"))
}

/// Load environment variables from .env files.
///
/// The current directory wins over `~/.quizctl/.env`; variables already
/// set in the process are never overwritten.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(_) => debug!("Loaded .env from {}", env_file.display()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_postgres() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "postgres");
        assert_eq!(config.user, "postgres");
        assert_eq!(config.password, None);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DatabaseConfig::from_toml_str(
            r#"
            [database]
            host = "db.internal"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn missing_table_yields_defaults() {
        let config = DatabaseConfig::from_toml_str("").unwrap();
        assert_eq!(config, DatabaseConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = DatabaseConfig::from_toml_str("[database\nhost=").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = DatabaseConfig::from_toml_str("[database]\nport = 6543\n").unwrap();
        config
            .apply_overrides(env_of(&[
                (ENV_PORT, "7000"),
                (ENV_NAME, "quiz"),
                (ENV_PASSWORD, "student"),
            ]))
            .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.database, "quiz");
        assert_eq!(config.password.as_deref(), Some("student"));
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = DatabaseConfig::default();
        let err = config
            .apply_overrides(env_of(&[(ENV_PORT, "not-a-port")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DatabaseConfig::load_from(&dir.path().join("typo.toml")).unwrap_err();
        assert!(err.to_string().contains("Config not found"));
        assert!(err.to_string().contains("typo.toml"));
    }

    #[test]
    fn zero_max_connections_is_rejected() {
        let mut config = DatabaseConfig::default();
        let err = config
            .apply_overrides(env_of(&[(ENV_MAX_CONNECTIONS, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_CONNECTIONS));
        assert_eq!(config.max_connections, 5);

        let err = DatabaseConfig::from_toml_str("[database]\nmax_connections = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nuser = \"quizmaster\"\nmax_connections = 2").unwrap();

        let config = DatabaseConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_connections, 2);
        // QUIZCTL_DB_USER may be set in the environment running the tests
        if env::var(ENV_USER).is_err() {
            assert_eq!(config.user, "quizmaster");
        }
    }

    #[test]
    fn debug_redacts_password() {
        let config = DatabaseConfig {
            password: Some("student123".to_string()),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("student123"));
        assert!(rendered.contains("***"));
    }
}
