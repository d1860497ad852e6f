//! Immutable storage configuration.
//!
//! # Responsibility
//! - Carry every storage knob the core consumes in one value.
//! - Be built once at startup and handed to `ConnectionProvider`.
//!
//! # Invariants
//! - Values never change after construction; sharing goes through `Arc`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default database file name used when callers do not override the path.
pub const DEFAULT_DB_FILE_NAME: &str = "love_journal.sqlite3";

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Storage configuration consumed by the connection provider and schema manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    path: PathBuf,
    busy_timeout: Duration,
    strict: bool,
}

impl DatabaseConfig {
    /// Creates a configuration for the given database file with defaults:
    /// 30 second busy timeout and strict tables.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            strict: true,
        }
    }

    /// Overrides how long a connection waits on a locked database.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Enables or disables SQLite `STRICT` tables for newly created relations.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseConfig;
    use std::time::Duration;

    #[test]
    fn defaults_are_strict_with_thirty_second_timeout() {
        let config = DatabaseConfig::new("/tmp/journal.db");
        assert!(config.strict());
        assert_eq!(config.busy_timeout(), Duration::from_secs(30));
        assert_eq!(config.path().to_str(), Some("/tmp/journal.db"));
    }

    #[test]
    fn builder_overrides_apply() {
        let config = DatabaseConfig::default()
            .with_busy_timeout(Duration::from_millis(250))
            .with_strict(false);
        assert!(!config.strict());
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
    }
}
