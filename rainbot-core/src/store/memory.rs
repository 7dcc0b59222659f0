use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Store, StoreError};

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(&(container.to_string(), key.to_string())).cloned())
    }

    async fn put(&self, container: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .insert((container.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, container: &str, key: &str) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .remove(&(container.to_string(), key.to_string()));
        Ok(())
    }

    fn locate(&self, container: &str, key: &str) -> String {
        format!("memory://{container}/{}", super::escape_key(key))
    }
}
