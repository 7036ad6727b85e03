use serde::Serialize;

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::models::Platform;

pub const LAUNCH_COMMAND: &str = "launch_publish";

/// How the launch command presents itself to menus, and who may run it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandRegistration {
    pub name: String,
    pub title: String,
    pub deny_permissions: Vec<String>,
    pub deny_platforms: Vec<Platform>,
    pub supports_multiple_selection: bool,
}

impl CommandRegistration {
    pub fn launch_publish(config: &LauncherConfig) -> Self {
        Self {
            name: LAUNCH_COMMAND.to_string(),
            title: "Open in Associated Application".to_string(),
            deny_permissions: config.deny_permissions.clone(),
            deny_platforms: config.deny_platforms.clone(),
            supports_multiple_selection: false,
        }
    }

    /// Refuse when the platform or the caller's permission group is denied.
    pub fn check(&self, platform: Platform, permission_group: Option<&str>) -> Result<(), LaunchError> {
        if self.deny_platforms.contains(&platform) {
            return Err(self.denied(format!("disabled on platform '{}'", platform)));
        }
        if let Some(group) = permission_group {
            if self.deny_permissions.iter().any(|g| g == group) {
                return Err(self.denied(format!("denied for permission group '{}'", group)));
            }
        }
        Ok(())
    }

    fn denied(&self, reason: String) -> LaunchError {
        LaunchError::CommandDenied {
            command: self.name.clone(),
            reason,
        }
    }
}
