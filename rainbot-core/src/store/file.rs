use async_trait::async_trait;
use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use super::{Store, StoreError, escape_key};

/// Stores each blob as one file at `<root>/<container>/<escaped key>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, container: &str, key: &str) -> PathBuf {
        self.root.join(escape_key(container)).join(escape_key(key))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        location: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.blob_path(container, key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    async fn put(&self, container: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let path = self.blob_path(container, key);
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|err| io_error(&parent, err))?;

        // Each write gets its own temp file, then renames over the target, so
        // concurrent writers never share a partial file.
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut tmp = NamedTempFile::new_in(&parent).map_err(|err| io_error(&parent, err))?;
            tmp.write_all(&value)
                .map_err(|err| io_error(tmp.path(), err))?;
            tmp.persist(&path)
                .map_err(|err| io_error(&path, err.error))?;
            Ok(())
        })
        .await
        .map_err(|err| StoreError::Backend(format!("blob write task failed: {err}")))?
    }

    async fn delete(&self, container: &str, key: &str) -> Result<(), StoreError> {
        let path = self.blob_path(container, key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    fn locate(&self, container: &str, key: &str) -> String {
        format!("file://{}", self.blob_path(container, key).display())
    }
}
