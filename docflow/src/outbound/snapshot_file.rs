//! File-backed [SnapshotStore]: one JSON file per user under one directory.
//!
//! Snapshots are a best-effort cache, so the adapter leans the same way:
//! a missing file loads as the empty snapshot and a corrupt file is
//! discarded with a warning rather than surfaced as an error.

use crate::domain::models::NotificationSnapshot;
use crate::domain::ports::SnapshotStore;
use docflow_env::{Environment, VarNameErr, env_var};
use model_document::UserId;
use std::path::PathBuf;
use thiserror::Error;


/// the types of errors that can occur on [FileSnapshots]
#[derive(Debug, Error)]
pub enum FileSnapshotErr {
    /// the filesystem failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// the snapshot could not be encoded
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// [SnapshotStore] rooted at one directory of per-user JSON files.
#[derive(Debug, Clone)]
pub struct FileSnapshots {
    dir: PathBuf,
}

impl FileSnapshots {
    /// a store rooted at the given directory; created on first write
    pub fn new(dir: impl Into<PathBuf>) -> FileSnapshots {
        FileSnapshots { dir: dir.into() }
    }

    /// The store rooted at the `DOCFLOW_SNAPSHOT_DIR` variable.
    ///
    /// Local runs may leave the variable unset and get a directory under
    /// the system temp root; everywhere else the variable is required.
    pub fn from_env() -> Result<FileSnapshots, VarNameErr> {
        env_var!(struct DocflowSnapshotDir;);

        match DocflowSnapshotDir::new() {
            Ok(dir) => Ok(FileSnapshots::new(dir.as_ref())),
            Err(err) => {
                if let Environment::Local = Environment::new_or_prod() {
                    let dir = std::env::temp_dir().join("docflow-snapshots");
                    tracing::info!(dir = %dir.display(), "snapshot dir not configured, using temp dir");
                    Ok(FileSnapshots::new(dir))
                } else {
                    Err(err)
                }
            }
        }
    }

    fn path_for(&self, user: &UserId) -> PathBuf {
        // fold anything path-hostile out of the id before it names a file
        let name: String = user
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl SnapshotStore for FileSnapshots {
    type Err = FileSnapshotErr;

    async fn load(&self, user: &UserId) -> Result<NotificationSnapshot, FileSnapshotErr> {
        let path = self.path_for(user);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(NotificationSnapshot::default());
            }
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "discarding unreadable snapshot file"
                );
                Ok(NotificationSnapshot::default())
            }
        }
    }

    async fn store(
        &self,
        user: &UserId,
        snapshot: &NotificationSnapshot,
    ) -> Result<(), FileSnapshotErr> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(snapshot)?;
        tokio::fs::write(self.path_for(user), bytes).await?;
        Ok(())
    }
}
