use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::BlobStore;

/// Blob store kept entirely in memory. Nothing survives the process.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with blobs
    pub fn with_blobs<I, K, V>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = blobs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            blobs: Arc::new(Mutex::new(map)),
        }
    }

    /// Current blob for a collection, bypassing the async trait
    pub fn snapshot(&self, collection: &str) -> Option<String> {
        self.blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(collection).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn load(&self, collection: &str) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory blob store lock poisoned"))?;
        Ok(blobs.get(collection).cloned())
    }

    async fn save(&self, collection: &str, blob: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory blob store lock poisoned"))?;
        blobs.insert(collection.to_string(), blob.to_string());
        Ok(())
    }

    async fn save_all(&self, batch: &[(&str, String)]) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory blob store lock poisoned"))?;
        for (collection, blob) in batch {
            blobs.insert(collection.to_string(), blob.clone());
        }
        Ok(())
    }
}
