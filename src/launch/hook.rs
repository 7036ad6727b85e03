//! Delegating known DCC file types to their launcher apps.

use std::collections::BTreeMap;

use super::shell::{run_logged, ShellRunner};
use super::strategy::{app_command, app_command_with_arg};
use crate::config::{has_extension, LauncherAppConfig};
use crate::error::LaunchError;
use crate::models::{EntityRef, LaunchContext, Platform};
use crate::tracker::StructureCreator;

/// Pluggable launch step run for files that exist on disk but are not viewer
/// material.
///
/// Returns `Ok(true)` when it launched something, `Ok(false)` to let the
/// caller fall back to the OS default, and `Err` for failures the user must
/// see.
pub trait LaunchHook {
    fn launch(
        &self,
        path: &str,
        context: &LaunchContext,
        associated_entity: Option<&EntityRef>,
    ) -> Result<bool, LaunchError>;
}

/// An application that can be started on a file.
pub trait LauncherApp {
    fn launch_from_path(&self, path: &str) -> Result<(), LaunchError>;

    /// Whether [`launch_from_path_and_context`](Self::launch_from_path_and_context)
    /// actually uses the context.
    fn supports_context(&self) -> bool {
        false
    }

    fn launch_from_path_and_context(
        &self,
        path: &str,
        _context: &LaunchContext,
    ) -> Result<(), LaunchError> {
        self.launch_from_path(path)
    }
}

/// The launcher apps installed in the current environment.
pub trait AppRegistry {
    fn app(&self, name: &str) -> Option<&dyn LauncherApp>;
}

/// One row of the extension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherEntry {
    pub extensions: &'static [&'static str],
    pub app: &'static str,
    pub engine: &'static str,
}

pub const LAUNCHER_TABLE: &[LauncherEntry] = &[
    LauncherEntry {
        extensions: &["nk"],
        app: "tk-shotgun-launchnuke",
        engine: "tk-nuke",
    },
    LauncherEntry {
        extensions: &["ma", "mb"],
        app: "tk-shotgun-launchmaya",
        engine: "tk-maya",
    },
    LauncherEntry {
        extensions: &["fbx"],
        app: "tk-shotgun-launchmotionbuilder",
        engine: "tk-motionbuilder",
    },
    LauncherEntry {
        extensions: &["hrx"],
        app: "tk-shotgun-launchhiero",
        engine: "tk-hiero",
    },
    LauncherEntry {
        extensions: &["max"],
        app: "tk-shotgun-launch3dsmax",
        engine: "tk-3dsmax",
    },
    LauncherEntry {
        extensions: &["psd"],
        app: "tk-shotgun-launchphotoshop",
        engine: "tk-photoshop",
    },
];

/// The table row whose extensions `path` ends with, if any.
pub fn launcher_for(path: &str) -> Option<&'static LauncherEntry> {
    LAUNCHER_TABLE
        .iter()
        .find(|entry| entry.extensions.iter().any(|ext| has_extension(path, ext)))
}

/// Default hook: hands scene files to the matching launcher app, creating the
/// associated entity's folders first.
pub struct AssociatedAppLauncher<'a> {
    apps: &'a dyn AppRegistry,
    structure: &'a dyn StructureCreator,
}

impl<'a> AssociatedAppLauncher<'a> {
    pub fn new(apps: &'a dyn AppRegistry, structure: &'a dyn StructureCreator) -> Self {
        Self { apps, structure }
    }
}

impl LaunchHook for AssociatedAppLauncher<'_> {
    fn launch(
        &self,
        path: &str,
        context: &LaunchContext,
        associated_entity: Option<&EntityRef>,
    ) -> Result<bool, LaunchError> {
        let Some(entry) = launcher_for(path) else {
            return Ok(false);
        };

        let app = self.apps.app(entry.app).ok_or_else(|| {
            LaunchError::CollaboratorLaunch(format!(
                "the {} app could not be found in the environment",
                entry.app
            ))
        })?;

        if let Some(entity) = associated_entity {
            self.structure
                .create_structure(&entity.entity_type, entity.id, entry.engine)
                .map_err(|e| {
                    LaunchError::CollaboratorLaunch(format!(
                        "could not create folders for {}: {:#}",
                        entity, e
                    ))
                })?;
        }

        if app.supports_context() {
            app.launch_from_path_and_context(path, context)?;
        } else {
            app.launch_from_path(path)?;
        }
        Ok(true)
    }
}

/// A launcher app described in configuration and started through the shell.
pub struct ConfiguredApp<'a> {
    name: String,
    executable: String,
    context_arg: Option<String>,
    platform: Platform,
    shell: &'a dyn ShellRunner,
}

impl ConfiguredApp<'_> {
    fn run(&self, command: String) -> Result<(), LaunchError> {
        run_logged(self.shell, &command, || {
            format!(
                "Failed to launch {} with '{}'! Check the executable path '{}' in the launcher configuration.",
                self.name, command, self.executable
            )
        })?;
        Ok(())
    }
}

impl LauncherApp for ConfiguredApp<'_> {
    fn launch_from_path(&self, path: &str) -> Result<(), LaunchError> {
        self.run(app_command(self.platform, &self.name, &self.executable, path))
    }

    fn supports_context(&self) -> bool {
        self.context_arg.is_some()
    }

    fn launch_from_path_and_context(
        &self,
        path: &str,
        context: &LaunchContext,
    ) -> Result<(), LaunchError> {
        match &self.context_arg {
            Some(flag) => self.run(app_command_with_arg(
                self.platform,
                &self.name,
                &self.executable,
                path,
                flag,
                &context.to_string(),
            )),
            None => self.launch_from_path(path),
        }
    }
}

/// Registry of the configured apps that have an executable on this platform.
pub struct ConfiguredApps<'a> {
    apps: BTreeMap<String, ConfiguredApp<'a>>,
}

impl<'a> ConfiguredApps<'a> {
    pub fn new(
        configs: &BTreeMap<String, LauncherAppConfig>,
        platform: Platform,
        shell: &'a dyn ShellRunner,
    ) -> Self {
        let apps = configs
            .iter()
            .filter_map(|(name, config)| {
                let executable = config.executable(platform)?;
                Some((
                    name.clone(),
                    ConfiguredApp {
                        name: name.clone(),
                        executable: executable.to_string(),
                        context_arg: config.context_arg.clone(),
                        platform,
                        shell,
                    },
                ))
            })
            .collect();
        Self { apps }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }
}

impl AppRegistry for ConfiguredApps<'_> {
    fn app(&self, name: &str) -> Option<&dyn LauncherApp> {
        self.apps.get(name).map(|app| app as &dyn LauncherApp)
    }
}
