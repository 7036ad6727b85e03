use serde::{Deserialize, Serialize};

/// A typed link to any record in the tracking database, e.g. `Shot 1234`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: i64,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.entity_type, self.id)
    }
}

/// Entity type name used for review versions.
pub const VERSION_ENTITY_TYPE: &str = "Version";

/// Entity type name used for pipeline tasks.
pub const TASK_ENTITY_TYPE: &str = "Task";

/// Which of the two historical schemas the site uses for published files.
///
/// Older sites store publishes as `TankPublishedFile` and link a version to a
/// single publish; newer sites use `PublishedFile` with a multi-entity link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PublishedFileType {
    #[default]
    PublishedFile,
    TankPublishedFile,
}

impl PublishedFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublishedFile => "PublishedFile",
            Self::TankPublishedFile => "TankPublishedFile",
        }
    }

    /// Name of the field on `Version` that links to publishes of this type.
    pub fn version_link_field(&self) -> &'static str {
        match self {
            Self::PublishedFile => "published_files",
            Self::TankPublishedFile => "tank_published_file",
        }
    }
}

impl std::fmt::Display for PublishedFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
