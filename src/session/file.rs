use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::{Session, SessionStore};
use crate::errors::SessionError;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk shape. Either key may be missing in a hand-edited file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Session persisted as a small JSON file, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let stored: StoredSession =
            serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        match (stored.access_token, stored.refresh_token) {
            (Some(access), Some(refresh)) => Ok(Some(Session::new(access, refresh))),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!(
                    path = %self.path.display(),
                    "session file holds only one of the two tokens, treating as signed out"
                );
                Ok(None)
            }
        }
    }

    fn set(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let stored = StoredSession {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
        };
        let content = serde_json::to_vec_pretty(&stored).map_err(SessionError::Serialize)?;

        self.locked(|| {
            // Readers only ever see a complete file: write a sibling, then rename.
            let tmp_path = self.tmp_path();
            let result = self
                .write_tmp(&tmp_path, &content)
                .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e)));
            if result.is_err() {
                let _ = fs::remove_file(&tmp_path);
            }
            result
        })
    }

    fn clear(&self) -> Result<(), SessionError> {
        if !self.lock_path().exists() && !self.path.exists() {
            return Ok(());
        }
        self.locked(|| match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        })
    }
}

impl FileSessionStore {
    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// Unique per writer, so concurrent writers never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_extension(format!("json.{}.{}.tmp", std::process::id(), seq))
    }

    /// Run `f` while holding the exclusive lock on the sibling `.lock` file.
    fn locked<T>(&self, f: impl FnOnce() -> Result<T, SessionError>) -> Result<T, SessionError> {
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.io_err(e))?;
        FileExt::lock_exclusive(&lock).map_err(|e| self.io_err(e))?;

        let result = f();

        if let Err(e) = FileExt::unlock(&lock) {
            tracing::warn!(path = %lock_path.display(), error = %e, "failed to release session lock");
        }
        result
    }

    fn write_tmp(&self, tmp_path: &Path, content: &[u8]) -> Result<(), SessionError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(tmp_path)
            .map_err(|e| self.io_err(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_err(e))?;
        }

        file.write_all(content).map_err(|e| self.io_err(e))?;
        file.sync_all().map_err(|e| self.io_err(e))
    }
}
