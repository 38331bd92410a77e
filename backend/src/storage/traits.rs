//! # Storage Traits
//!
//! The persistence capability the `Store` is built on. A blob store keeps one
//! text blob per collection name, the same contract a browser's local storage
//! offers, so any backend that can map a key to a string can host the studio
//! data.

use anyhow::Result;
use async_trait::async_trait;

/// Key-value persistence for whole collections serialized as JSON text
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Load the blob stored under `collection`, if any
    async fn load(&self, collection: &str) -> Result<Option<String>>;

    /// Store `blob` under `collection`, replacing any previous value
    async fn save(&self, collection: &str, blob: &str) -> Result<()>;

    /// Store several collections as one unit: either every blob is replaced
    /// or none is
    async fn save_all(&self, blobs: &[(&str, String)]) -> Result<()>;
}
