//! Picking the single publish a launch request refers to.

use crate::config::{ExtensionPolicy, SelectionMode};
use crate::error::LaunchError;
use crate::models::{Platform, PublishedFile, PublishedFileType, VERSION_ENTITY_TYPE};
use crate::resolve::try_resolve_path;
use crate::tracker::Tracker;

/// Decides which of several publishes linked to one version gets launched.
pub trait SelectionPolicy {
    /// `candidates` is never empty and is in version link order, and
    /// `extensions` is never empty.
    fn choose(
        &self,
        candidates: Vec<PublishedFile>,
        extensions: &ExtensionPolicy,
        platform: Platform,
    ) -> Result<PublishedFile, LaunchError>;
}

/// First publish matching a viewer extension, else the first publish.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatchOrFirst;

/// First publish matching a viewer extension, else an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictMatch;

impl SelectionPolicy for FirstMatchOrFirst {
    fn choose(
        &self,
        mut candidates: Vec<PublishedFile>,
        extensions: &ExtensionPolicy,
        platform: Platform,
    ) -> Result<PublishedFile, LaunchError> {
        match first_match(&candidates, extensions, platform) {
            Some(index) => Ok(candidates.swap_remove(index)),
            None => Ok(candidates.swap_remove(0)),
        }
    }
}

impl SelectionPolicy for StrictMatch {
    fn choose(
        &self,
        mut candidates: Vec<PublishedFile>,
        extensions: &ExtensionPolicy,
        platform: Platform,
    ) -> Result<PublishedFile, LaunchError> {
        match first_match(&candidates, extensions, platform) {
            Some(index) => Ok(candidates.swap_remove(index)),
            None => Err(LaunchError::NoMatchingExtension {
                extensions: extensions.to_string(),
                candidates: candidates.iter().map(|p| p.id).collect(),
            }),
        }
    }
}

/// Index of the winning candidate: extensions are walked in priority order,
/// candidates in link order within each extension.
fn first_match(
    candidates: &[PublishedFile],
    extensions: &ExtensionPolicy,
    platform: Platform,
) -> Option<usize> {
    let paths: Vec<Option<String>> = candidates
        .iter()
        .map(|p| try_resolve_path(p, platform))
        .collect();

    extensions.iter().find_map(|ext| {
        paths.iter().position(|path| {
            path.as_deref()
                .is_some_and(|p| crate::config::has_extension(p, ext))
        })
    })
}

impl SelectionMode {
    pub fn policy(&self) -> Box<dyn SelectionPolicy + Send + Sync> {
        match self {
            Self::FirstMatchOrFirst => Box::new(FirstMatchOrFirst),
            Self::Strict => Box::new(StrictMatch),
        }
    }
}

/// What a launch request points at, parsed once from its entity type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Publish(PublishedFileType),
    Version,
}

impl SelectionTarget {
    pub fn parse(entity_type: &str, kind: PublishedFileType) -> Result<Self, LaunchError> {
        if entity_type == kind.as_str() {
            Ok(Self::Publish(kind))
        } else if entity_type == VERSION_ENTITY_TYPE {
            Ok(Self::Version)
        } else {
            Err(LaunchError::UnsupportedEntityType {
                expected: kind.as_str().to_string(),
                actual: entity_type.to_string(),
            })
        }
    }
}

/// Resolves a `(entity_type, ids)` request to exactly one publish.
pub struct ArtifactSelector<'a, T: Tracker + ?Sized> {
    tracker: &'a T,
    kind: PublishedFileType,
    extensions: &'a ExtensionPolicy,
    policy: &'a dyn SelectionPolicy,
    platform: Platform,
}

impl<'a, T: Tracker + ?Sized> ArtifactSelector<'a, T> {
    pub fn new(
        tracker: &'a T,
        kind: PublishedFileType,
        extensions: &'a ExtensionPolicy,
        policy: &'a dyn SelectionPolicy,
        platform: Platform,
    ) -> Self {
        Self {
            tracker,
            kind,
            extensions,
            policy,
            platform,
        }
    }

    pub fn select(&self, entity_type: &str, ids: &[i64]) -> Result<PublishedFile, LaunchError> {
        let target = SelectionTarget::parse(entity_type, self.kind)?;

        let &[id] = ids else {
            return Err(LaunchError::UnsupportedBatchSize(ids.len()));
        };

        match target {
            SelectionTarget::Publish(kind) => self.fetch_publish(kind, id),
            SelectionTarget::Version => self.select_from_version(id),
        }
    }

    fn select_from_version(&self, version_id: i64) -> Result<PublishedFile, LaunchError> {
        let version = self
            .tracker
            .find_version(version_id)?
            .ok_or_else(|| LaunchError::RecordNotFound {
                entity_type: VERSION_ENTITY_TYPE.to_string(),
                id: version_id,
            })?;

        let linked = version.linked_ids(self.kind);
        match linked.as_slice() {
            [] => Err(LaunchError::NoLinkedArtifact(version_id)),
            [only] => self.fetch_publish(self.kind, *only),
            _ => {
                if self.extensions.is_empty() {
                    return Err(LaunchError::MissingViewerExtensions(version_id));
                }
                let candidates = self.tracker.find_published_files(self.kind, &linked)?;
                if candidates.is_empty() {
                    return Err(LaunchError::NoLinkedArtifact(version_id));
                }
                tracing::debug!(
                    "Version {} links {} publishes, choosing by extensions [{}]",
                    version_id,
                    candidates.len(),
                    self.extensions
                );
                self.policy.choose(candidates, self.extensions, self.platform)
            }
        }
    }

    fn fetch_publish(&self, kind: PublishedFileType, id: i64) -> Result<PublishedFile, LaunchError> {
        self.tracker
            .find_published_file(kind, id)?
            .ok_or_else(|| LaunchError::RecordNotFound {
                entity_type: kind.as_str().to_string(),
                id,
            })
    }
}
