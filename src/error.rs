use thiserror::Error;

/// Everything that can stop a publish from being resolved or launched.
///
/// Every message is a single line naming the entity id, path or platform at
/// fault, so surfaces can show it to the user as-is.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Sorry, this app only works with entities of type {expected} or Version, not {actual}")]
    UnsupportedEntityType { expected: String, actual: String },

    #[error("Action only accepts a single item, got {0}")]
    UnsupportedBatchSize(usize),

    #[error("{entity_type} {id} does not exist")]
    RecordNotFound { entity_type: String, id: i64 },

    #[error("Version {0} has no associated published file")]
    NoLinkedArtifact(i64),

    #[error("Sorry, viewer extensions must be provided when Version {0} has multiple published files")]
    MissingViewerExtensions(i64),

    #[error("Could not find a published file matching viewer extensions [{extensions}] among ids {candidates:?}")]
    NoMatchingExtension {
        extensions: String,
        candidates: Vec<i64>,
    },

    #[error("Unable to determine the path on disk for published file id={0}")]
    PathNotResolvable(i64),

    #[error("No viewer executable is configured for platform '{0}'")]
    MissingViewerConfiguration(String),

    #[error("Platform '{0}' is not supported")]
    UnsupportedPlatform(String),

    #[error("The file associated with this publish, {0}, cannot be found on disk")]
    MissingOnDisk(String),

    #[error("Failed to launch an application for this published file: {0}")]
    CollaboratorLaunch(String),

    #[error("Command '{command}' is not available: {reason}")]
    CommandDenied { command: String, reason: String },

    #[error("Tracking database error: {0}")]
    Tracker(#[from] anyhow::Error),

    #[error("Failed to run shell command: {0}")]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    /// Errors caused by what the caller asked for rather than by the
    /// environment. Surfaces report these as bad requests.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEntityType { .. }
                | Self::UnsupportedBatchSize(_)
                | Self::NoLinkedArtifact(_)
                | Self::NoMatchingExtension { .. }
                | Self::PathNotResolvable(_)
        )
    }
}
