use serde::{Deserialize, Serialize};

use super::PublishedFileType;

/// A review version. Only the link fields matter to the launcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub id: i64,
    pub code: Option<String>,
    /// Multi-entity link used by `PublishedFile` sites, in link order.
    pub published_files: Vec<i64>,
    /// Single link used by legacy `TankPublishedFile` sites.
    pub tank_published_file: Option<i64>,
}

impl Version {
    /// Ids linked through the field that belongs to `kind`.
    pub fn linked_ids(&self, kind: PublishedFileType) -> Vec<i64> {
        match kind {
            PublishedFileType::PublishedFile => self.published_files.clone(),
            PublishedFileType::TankPublishedFile => self.tank_published_file.into_iter().collect(),
        }
    }
}

/// Input for creating a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersionInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub published_files: Vec<i64>,
    #[serde(default)]
    pub tank_published_file: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_ids_follow_the_schema_variant() {
        let version = Version {
            id: 1,
            code: None,
            published_files: vec![3, 4],
            tank_published_file: Some(9),
        };

        assert_eq!(version.linked_ids(PublishedFileType::PublishedFile), vec![3, 4]);
        assert_eq!(version.linked_ids(PublishedFileType::TankPublishedFile), vec![9]);
    }
}
