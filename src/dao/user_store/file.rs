use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;

use crate::dao::storage::{StorageError, StorageResult};

use super::{PersistentStateStore, SnapshotBackend};

/// Store mirrored to a local JSON file.
pub type FileStateStore = PersistentStateStore<FileSnapshots>;

/// Snapshot kept in a JSON file that is rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct FileSnapshots {
    path: Arc<Path>,
}

impl FileSnapshots {
    /// Snapshots stored at `path`; the file is created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
        }
    }
}

impl FileStateStore {
    /// Open a store backed by the file at `path`, loading it when it exists.
    pub async fn open_file(path: impl Into<PathBuf>) -> StorageResult<Self> {
        Self::open(FileSnapshots::new(path)).await
    }
}

impl SnapshotBackend for FileSnapshots {
    fn describe(&self) -> String {
        format!("file `{}`", self.path.display())
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let path = self.path.clone();
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to read snapshot file `{}`", path.display()),
                    err,
                )),
            }
        })
    }

    fn save(&self, payload: String) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            tokio::fs::write(&path, payload).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to write snapshot file `{}`", path.display()),
                    err,
                )
            })
        })
    }
}
