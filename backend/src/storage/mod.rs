//! # Storage Module
//!
//! Persistence for the studio collections.
//!
//! The domain never talks to a database or the filesystem directly. It works
//! against [`Store`], which keeps students, classes, payments and plans in
//! memory and writes whole collections through a [`BlobStore`]:
//!
//! - **sqlite**: a single `key_values` table (default)
//! - **json_files**: one `<collection>.json` file per collection
//! - **memory**: nothing persisted, used by tests
//!
//! Referential integrity (removing a student removes their payments and
//! sessions) is enforced here.

pub mod json_files;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use json_files::JsonFileConnection;
pub use memory::MemoryBlobStore;
pub use sqlite::DbConnection;
pub use store::{CascadeOutcome, Collection, Store, StudioData};
pub use traits::BlobStore;
