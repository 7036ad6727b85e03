//! Dispatching a resolved path to a viewer, a launcher app or the OS.

mod hook;
mod shell;
mod strategy;

pub use hook::*;
pub use shell::*;
pub use strategy::*;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ExtensionPolicy;
use crate::error::LaunchError;
use crate::models::{LaunchContext, Platform, PublishedFile, TASK_ENTITY_TYPE};
use crate::tracker::ContextResolver;

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// Handed to the configured image viewer.
    Viewer,
    /// A launcher app took the file.
    Hook,
    /// Opened with the OS file association.
    DefaultOpen,
    /// Nothing was launched because the file does not exist.
    MissingOnDisk,
}

impl LaunchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Hook => "hook",
            Self::DefaultOpen => "default_open",
            Self::MissingOnDisk => "missing_on_disk",
        }
    }

    pub fn launched(&self) -> bool {
        !matches!(self, Self::MissingOnDisk)
    }
}

/// Viewer first, then the launch hook, then the OS default.
///
/// The viewer check runs before the existence check: image sequence paths
/// such as `shot.%04d.exr` never exist as a literal file.
pub struct DispatchChain<'a> {
    pub platform: Platform,
    pub viewer_extensions: &'a ExtensionPolicy,
    pub viewer_path: Option<&'a str>,
    pub shell: &'a dyn ShellRunner,
    pub contexts: &'a dyn ContextResolver,
    pub hook: &'a dyn LaunchHook,
}

impl DispatchChain<'_> {
    pub fn dispatch(&self, path: &str, publish: &PublishedFile) -> Result<LaunchOutcome, LaunchError> {
        if self.viewer_extensions.matches(path) {
            self.launch_viewer(path)?;
            return Ok(LaunchOutcome::Viewer);
        }

        if !Path::new(path).exists() {
            tracing::error!("{}", LaunchError::MissingOnDisk(path.to_string()));
            return Ok(LaunchOutcome::MissingOnDisk);
        }

        let context = self.context_for(path, publish)?;
        tracing::debug!("Launching {} in context '{}'", path, context);

        if self.hook.launch(path, &context, publish.entity.as_ref())? {
            return Ok(LaunchOutcome::Hook);
        }

        self.launch_default(path)?;
        Ok(LaunchOutcome::DefaultOpen)
    }

    /// Task-based context when the publish has a task, since paths often
    /// lack the task; otherwise whatever the path implies.
    fn context_for(&self, path: &str, publish: &PublishedFile) -> Result<LaunchContext, LaunchError> {
        let context = match &publish.task {
            Some(task) => self.contexts.context_from_entity(TASK_ENTITY_TYPE, task.id)?,
            None => self.contexts.context_from_path(path)?,
        };
        Ok(context)
    }

    fn launch_viewer(&self, path: &str) -> Result<(), LaunchError> {
        let viewer = ConfiguredViewer {
            app_path: self.viewer_path,
        };
        let command = viewer.command(self.platform, path)?;
        run_logged(self.shell, &command, || {
            format!(
                "Failed to launch Viewer! This is most likely because the path to the viewer \
                 executable is not set to a correct value. The current value is '{}', please \
                 check it in the launcher configuration.",
                self.viewer_path.unwrap_or_default()
            )
        })?;
        Ok(())
    }

    fn launch_default(&self, path: &str) -> Result<(), LaunchError> {
        tracing::debug!("Launching default system viewer for file {}", path);
        let command = DefaultOpen.command(self.platform, path)?;
        run_logged(self.shell, &command, || format!("Failed to launch '{}'!", command))?;
        Ok(())
    }
}
