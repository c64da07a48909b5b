#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const STORAGE_DIR_ENV: &str = "MEMBLOCKS_STORAGE_DIR";
pub const BUSY_TIMEOUT_ENV: &str = "MEMBLOCKS_BUSY_TIMEOUT_MS";
pub const HISTORY_LIMIT_ENV: &str = "MEMBLOCKS_HISTORY_LIMIT";

const DEFAULT_DB_FILE_NAME: &str = "memblocks.db";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_HISTORY_LIMIT: usize = 50;
pub(crate) const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
    pub db_file_name: String,
    /// How long a writer waits for the database lock before failing.
    pub busy_timeout: Duration,
    /// Used by history reads that pass a zero limit.
    pub default_history_limit: usize,
}

impl StoreConfig {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            default_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage_dir = non_empty(lookup(STORAGE_DIR_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| default_storage_dir(&lookup));

        let mut config = Self::new(storage_dir);
        if let Some(ms) = parse_u64(lookup(BUSY_TIMEOUT_ENV)) {
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_u64(lookup(HISTORY_LIMIT_ENV)) {
            config.default_history_limit = clamp_history_limit(limit as usize);
        }
        config
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(&self.db_file_name)
    }

    pub(crate) fn history_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_history_limit
        } else {
            clamp_history_limit(requested)
        }
    }
}

fn default_storage_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(state) = non_empty(lookup("XDG_STATE_HOME")) {
        return PathBuf::from(state).join("memblocks");
    }
    if let Some(home) = non_empty(lookup("HOME")) {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("memblocks");
    }
    PathBuf::from(".memblocks")
}

fn clamp_history_limit(value: usize) -> usize {
    value.clamp(1, MAX_HISTORY_LIMIT)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_u64(value: Option<String>) -> Option<u64> {
    value.and_then(|raw| raw.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_env_wins() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (STORAGE_DIR_ENV, "/srv/memblocks"),
            (BUSY_TIMEOUT_ENV, "250"),
            (HISTORY_LIMIT_ENV, "10"),
            ("HOME", "/home/tutor"),
        ]));
        assert_eq!(config.storage_dir, PathBuf::from("/srv/memblocks"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.default_history_limit, 10);
        assert_eq!(config.db_path(), PathBuf::from("/srv/memblocks/memblocks.db"));
    }

    #[test]
    fn falls_back_to_state_dirs() {
        let xdg = StoreConfig::from_lookup(lookup_from(&[
            ("XDG_STATE_HOME", "/state"),
            ("HOME", "/home/tutor"),
        ]));
        assert_eq!(xdg.storage_dir, PathBuf::from("/state/memblocks"));

        let home = StoreConfig::from_lookup(lookup_from(&[("HOME", "/home/tutor")]));
        assert_eq!(
            home.storage_dir,
            PathBuf::from("/home/tutor/.local/state/memblocks")
        );

        let bare = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(bare.storage_dir, PathBuf::from(".memblocks"));
        assert_eq!(bare.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn malformed_numbers_keep_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (STORAGE_DIR_ENV, "/tmp/x"),
            (BUSY_TIMEOUT_ENV, "soon"),
            (HISTORY_LIMIT_ENV, "100000"),
        ]));
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(config.default_history_limit, MAX_HISTORY_LIMIT);
    }

    #[test]
    fn zero_history_limit_uses_default() {
        let config = StoreConfig::new("/tmp/x");
        assert_eq!(config.history_limit(0), DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.history_limit(3), 3);
        assert_eq!(config.history_limit(10_000), MAX_HISTORY_LIMIT);
    }
}
