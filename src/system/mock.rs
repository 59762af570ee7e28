//! Mock system implementation for testing

use super::System;
use std::collections::HashMap;
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem and environment,
/// for fast, isolated unit tests without side effects.
///
/// # Example
/// ```
/// use slack_butler::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("SLACK_TOKEN", "xoxb-123").unwrap()
///     .with_file("/home/user/.config/slack-butler/config.yaml", b"token: xoxb-456").unwrap();
///
/// assert_eq!(system.env_var("SLACK_TOKEN").unwrap(), "xoxb-123");
/// assert!(system.is_file(Path::new("/home/user/.config/slack-butler/config.yaml")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    config_dir: Option<PathBuf>,
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    ///
    /// The configuration directory defaults to `/home/user/.config`.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                config_dir: Some(PathBuf::from("/home/user/.config")),
                files: HashMap::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set or clear the per-user configuration directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_config_dir<P: AsRef<Path>>(self, dir: Option<P>) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.config_dir = dir.map(|d| d.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let mut state = self
            .state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        state
            .files
            .insert(path.as_ref().to_path_buf(), contents.to_vec());
        drop(state);
        Ok(self)
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn config_dir(&self) -> Option<PathBuf> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.config_dir.clone())
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let bytes = state.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        let result = bytes.clone();
        drop(state);
        String::from_utf8(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.state
            .read()
            .map(|state| state.files.contains_key(path))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_is_not_present() {
        let system = MockSystem::new();
        assert_eq!(system.env_var("SLACK_TOKEN"), Err(VarError::NotPresent));
    }

    #[test]
    fn files_round_trip() {
        let system = MockSystem::new().with_file("/a/b.yaml", b"token: x").unwrap();
        assert!(system.is_file(Path::new("/a/b.yaml")));
        assert!(!system.is_file(Path::new("/a/c.yaml")));
        assert_eq!(
            system.read_to_string(Path::new("/a/b.yaml")).unwrap(),
            "token: x"
        );
        assert_eq!(
            system
                .read_to_string(Path::new("/a/c.yaml"))
                .unwrap_err()
                .kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn config_dir_can_be_cleared() {
        let system = MockSystem::new().with_config_dir(None::<&str>).unwrap();
        assert!(system.config_dir().is_none());
    }
}
