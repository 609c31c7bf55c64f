//! Database and handle configuration.
//!
//! ```toml
//! [database]
//! path = "db.sqlite3"
//! busy_timeout_ms = 5000
//! foreign_keys = true
//! journal_mode = "wal"
//!
//! [handle]
//! strict_deletes = true
//! reset_on_drop = true
//! ```

use crate::error::{ConfigError, ConnectionError};
use rusqlite::Connection;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
    time::Duration,
};
use tracing::debug;

/// Names a TOML file to load with [`Config::from_env`].
pub const CONFIG_ENV: &str = "TABLEKIT_CONFIG";

/// Overrides `database.path` in [`Config::from_env`].
pub const DATABASE_ENV: &str = "TABLEKIT_DATABASE";

/// Database path used when nothing else is configured.
pub const DEFAULT_DATABASE: &str = "db.sqlite3";

/// Path that opens a private in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub handle: HandleOptions,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Resolve from the environment: the file named by `TABLEKIT_CONFIG`
    /// (defaults otherwise), then the `TABLEKIT_DATABASE` path override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(path) = env::var_os(DATABASE_ENV) {
            config.database.path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Configuration for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from(MEMORY_DATABASE),
                ..DatabaseConfig::default()
            },
            ..Self::default()
        }
    }
}

///
/// DatabaseConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
    pub journal_mode: Option<JournalMode>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE),
            busy_timeout_ms: 5_000,
            foreign_keys: true,
            journal_mode: None,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_DATABASE
    }

    /// Open a connection and apply the connection-level pragmas.
    pub fn open(&self) -> Result<Connection, ConnectionError> {
        let wrap = |source: rusqlite::Error| ConnectionError::Open {
            path: self.path.clone(),
            source,
        };

        let conn = if self.is_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&self.path)
        }
        .map_err(wrap)?;

        conn.busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .map_err(wrap)?;
        conn.pragma_update(None, "foreign_keys", self.foreign_keys)
            .map_err(wrap)?;
        if let Some(mode) = self.journal_mode {
            conn.pragma_update_and_check(None, "journal_mode", mode.as_str(), |_| Ok(()))
                .map_err(wrap)?;
        }

        debug!(path = %self.path.display(), "opened connection");

        Ok(conn)
    }
}

///
/// JournalMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

///
/// HandleOptions
///
/// strict_deletes : reject delete/update calls with no filters
/// reset_on_drop  : dropping the table clears the created latch
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HandleOptions {
    pub strict_deletes: bool,
    pub reset_on_drop: bool,
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            strict_deletes: true,
            reset_on_drop: true,
        }
    }
}

///
/// INSTALLED
/// process-wide config used when a declared type binds its handle
///

static INSTALLED: RwLock<Option<Config>> = RwLock::new(None);

/// Install the process-wide config. Handles that are already bound keep the
/// config they were opened with.
pub fn install(config: Config) {
    *INSTALLED.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
}

/// The installed config, resolving it from the environment on first use.
pub fn current() -> Result<Config, ConfigError> {
    if let Some(config) = INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Ok(config.clone());
    }

    let config = Config::from_env()?;
    let mut slot = INSTALLED.write().unwrap_or_else(PoisonError::into_inner);

    Ok(slot.get_or_insert(config).clone())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();

        assert_eq!(config.database.path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.database.foreign_keys);
        assert!(config.handle.strict_deletes);
        assert!(config.handle.reset_on_drop);
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [database]
            path = "app.db"
            journal_mode = "wal"

            [handle]
            strict_deletes = false
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("app.db"));
        assert_eq!(config.database.journal_mode, Some(JournalMode::Wal));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(!config.handle.strict_deletes);
        assert!(config.handle.reset_on_drop);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[database]\npth = \"typo.db\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("missing.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablekit.toml");
        fs::write(&path, "[database]\npath = \":memory:\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.database.is_memory());
    }

    #[test]
    fn open_in_memory_applies_pragmas() {
        let conn = Config::in_memory().database.open().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(fk, 1);
    }

    #[test]
    fn open_file_with_wal() {
        let dir = tempfile::tempdir().unwrap();
        let database = DatabaseConfig {
            path: dir.path().join("wal.db"),
            journal_mode: Some(JournalMode::Wal),
            ..DatabaseConfig::default()
        };

        let conn = database.open().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();

        assert_eq!(mode, "wal");
    }
}
