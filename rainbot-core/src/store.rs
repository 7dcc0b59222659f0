//! Blob-style key/value storage, partitioned into named containers.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Store: Send + Sync + Debug {
    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value`, replacing whatever was stored under `key`.
    async fn put(&self, container: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, container: &str, key: &str) -> Result<(), StoreError>;

    /// URL-like location of a stored blob, suitable for an attachment.
    fn locate(&self, container: &str, key: &str) -> String;
}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(container, key).await
    }

    async fn put(&self, container: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(container, key, value).await
    }

    async fn delete(&self, container: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(container, key).await
    }

    fn locate(&self, container: &str, key: &str) -> String {
        (**self).locate(container, key)
    }
}

/// Escape a key so it is safe as a single path segment.
pub(crate) fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => escaped.push(byte as char),
            other => escaped.push_str(&format!("%{other:02X}")),
        }
    }
    escaped
}
