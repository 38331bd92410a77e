//! # JSON File Blob Store
//!
//! Stores each collection as `<collection>.json` in the data directory.
//!
//! ```text
//! data/
//! ├── studio_config.yaml
//! ├── me_pilates_students.json
//! ├── me_pilates_classes.json
//! ├── me_pilates_payments.json
//! └── me_pilates_plans.json
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so a crash
//! mid-write leaves the previous blob intact. A batch writes every `.tmp` file
//! before the first rename; a failed write removes the temp files and leaves
//! all collections as they were.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::traits::BlobStore;

/// JsonFileConnection manages one JSON file per collection
#[derive(Clone)]
pub struct JsonFileConnection {
    base_directory: PathBuf,
}

impl JsonFileConnection {
    /// Create a new connection, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the file backing a collection
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", collection))
    }

    fn temp_path(&self, collection: &str) -> PathBuf {
        self.collection_path(collection).with_extension("json.tmp")
    }

    async fn discard_temp_files(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!("Failed to remove temp file {}: {}", path.display(), e);
            }
        }
    }
}

#[async_trait]
impl BlobStore for JsonFileConnection {
    async fn load(&self, collection: &str) -> Result<Option<String>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            debug!("No file for collection {} at {}", collection, path.display());
            return Ok(None);
        }

        let blob = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(blob))
    }

    async fn save(&self, collection: &str, blob: &str) -> Result<()> {
        let path = self.collection_path(collection);
        let temp_path = self.temp_path(collection);

        tokio::fs::write(&temp_path, blob)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!("Saved collection {} to {}", collection, path.display());
        Ok(())
    }

    async fn save_all(&self, blobs: &[(&str, String)]) -> Result<()> {
        let mut written = Vec::with_capacity(blobs.len());
        for (collection, blob) in blobs {
            let temp_path = self.temp_path(collection);
            if let Err(e) = tokio::fs::write(&temp_path, blob).await {
                Self::discard_temp_files(&written).await;
                return Err(e).with_context(|| format!("Failed to write {}", temp_path.display()));
            }
            written.push(temp_path);
        }

        for (collection, _) in blobs {
            let path = self.collection_path(collection);
            tokio::fs::rename(self.temp_path(collection), &path)
                .await
                .with_context(|| format!("Failed to move {} into place", path.display()))?;
        }

        debug!("Saved {} collections to {}", blobs.len(), self.base_directory.display());
        Ok(())
    }
}
