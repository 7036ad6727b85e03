use serde::{Deserialize, Serialize};

use super::{EntityRef, PublishedFileType};

/// Where a published file lives.
///
/// Toolkit publishes fill in `local_path`; zero-config publishes only carry a
/// `file://` URL. In practice at most one of the two is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathDescriptor {
    pub local_path: Option<String>,
    pub url: Option<String>,
}

impl PathDescriptor {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            local_path: Some(path.into()),
            url: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            local_path: None,
            url: Some(url.into()),
        }
    }
}

/// A published file record, as returned by the tracker with its path, task
/// and associated entity fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedFile {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: PublishedFileType,
    pub code: Option<String>,
    pub path: PathDescriptor,
    pub task: Option<EntityRef>,
    /// The shot, asset or other entity the publish belongs to.
    pub entity: Option<EntityRef>,
}

/// Input for creating a published file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePublishedFileInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: PublishedFileType,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub path: PathDescriptor,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub entity: Option<EntityRef>,
    #[serde(default)]
    pub project_id: Option<i64>,
}
