//! Session token storage.
//!
//! The bearer token is kept in a `Session` handle that is cloned into the API
//! client and the screens. File-backed sessions write through to
//! `<home>/session.json` (mode 0600 on unix) under the `token` key.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session file name inside the cryptodesk home directory.
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Shared handle to the current bearer token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl Session {
    /// A session that lives only for this process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the session stored at `path`. A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let token = read_token(&path)?;
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(path),
        })
    }

    /// Like [`Session::open`], but an unreadable token file starts an empty
    /// session instead of failing. The next login rewrites the file.
    pub fn open_or_reset(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        match Self::open(path.clone()) {
            Err(err @ SessionError::Parse { .. }) => {
                warn!(error = %err, "discarding unreadable session file");
                Ok(Self {
                    token: Arc::default(),
                    path: Some(path),
                })
            }
            other => other,
        }
    }

    /// Returns the token if one is set and non-empty.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Replaces the token, persisting it first when the session is file-backed.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if let Some(path) = &self.path {
            write_token(path, &token)?;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }
}

fn read_token(path: &Path) -> Result<Option<String>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let stored: StoredSession =
        serde_json::from_str(&contents).map_err(|source| SessionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(stored.token)
}

fn write_token(path: &Path, token: &str) -> Result<(), SessionError> {
    let write_err = |source| SessionError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let stored = StoredSession {
        token: Some(token.to_string()),
    };
    let contents = serde_json::to_string_pretty(&stored).map_err(|source| SessionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_session_starts_empty() {
        let session = Session::in_memory();
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let session = Session::in_memory();
        session.set_token("").unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_clones_share_the_token() {
        let session = Session::in_memory();
        let view_handle = session.clone();

        session.set_token("tok123").unwrap();

        assert_eq!(view_handle.token().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_token_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);

        let session = Session::open(&path).unwrap();
        assert_eq!(session.token(), None);
        session.set_token("tok123").unwrap();

        let reopened = Session::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok123"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["token"], "tok123");
    }

    #[test]
    fn test_new_login_overwrites_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE);

        let session = Session::open(&path).unwrap();
        session.set_token("first").unwrap();
        session.set_token("second").unwrap();

        assert_eq!(Session::open(&path).unwrap().token().as_deref(), Some("second"));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "not json").unwrap();

        let err = Session::open(&path).unwrap_err();
        assert!(matches!(err, SessionError::Parse { .. }));
    }

    #[test]
    fn test_corrupt_file_resets_to_empty_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "{\"token\": ").unwrap();

        let session = Session::open_or_reset(&path).unwrap();
        assert!(!session.is_authenticated());

        session.set_token("fresh").unwrap();
        assert_eq!(Session::open(&path).unwrap().token().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_reset_keeps_valid_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        Session::open(&path).unwrap().set_token("tok123").unwrap();

        let session = Session::open_or_reset(&path).unwrap();
        assert_eq!(session.token().as_deref(), Some("tok123"));
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        Session::open(&path).unwrap().set_token("tok").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
