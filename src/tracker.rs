//! Seams to the production-tracking site.
//!
//! The pipeline only talks to the tracker through these traits. The
//! [`Database`](crate::db::Database) mirror implements all three.

use anyhow::Result;

use crate::models::{LaunchContext, PublishedFile, PublishedFileType, Version};

/// Read access to publish and version records.
pub trait Tracker {
    /// The publish with `id` and its path, task and entity fields.
    fn find_published_file(
        &self,
        kind: PublishedFileType,
        id: i64,
    ) -> Result<Option<PublishedFile>>;

    /// All publishes of `kind` among `ids`, in the order of `ids`. Unknown
    /// ids are skipped.
    fn find_published_files(
        &self,
        kind: PublishedFileType,
        ids: &[i64],
    ) -> Result<Vec<PublishedFile>>;

    /// The version with `id` and its publish links.
    fn find_version(&self, id: i64) -> Result<Option<Version>>;
}

/// Derives launch contexts from tracker records or from file paths.
pub trait ContextResolver {
    fn context_from_entity(&self, entity_type: &str, id: i64) -> Result<LaunchContext>;

    fn context_from_path(&self, path: &str) -> Result<LaunchContext>;
}

/// Creates the on-disk folders for an entity. Must be safe to call again
/// for an entity whose folders already exist.
pub trait StructureCreator {
    fn create_structure(&self, entity_type: &str, entity_id: i64, engine: &str) -> Result<()>;
}
