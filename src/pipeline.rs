//! The launch command end to end: select, resolve, dispatch.

use serde::{Deserialize, Serialize};

use crate::config::LauncherConfig;
use crate::db::Database;
use crate::error::LaunchError;
use crate::launch::{
    AssociatedAppLauncher, ConfiguredApps, DispatchChain, LaunchHook, LaunchOutcome, ShellRunner,
    SystemShell,
};
use crate::models::{Platform, PublishedFile};
use crate::registration::CommandRegistration;
use crate::resolve::resolve_path;
use crate::select::ArtifactSelector;
use crate::tracker::{ContextResolver, Tracker};

/// Result of a launch request that got as far as dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchReport {
    pub publish_id: i64,
    pub path: String,
    pub outcome: LaunchOutcome,
}

/// One launch invocation's worth of collaborators. Build a fresh one per
/// request; nothing carries over between invocations.
pub struct PublishLauncher<'a> {
    pub config: &'a LauncherConfig,
    pub platform: Platform,
    pub tracker: &'a dyn Tracker,
    pub contexts: &'a dyn ContextResolver,
    pub shell: &'a dyn ShellRunner,
    pub hook: &'a dyn LaunchHook,
}

impl PublishLauncher<'_> {
    /// Select the publish a request refers to and work out its local path.
    pub fn resolve_publish(
        &self,
        entity_type: &str,
        ids: &[i64],
    ) -> Result<(PublishedFile, String), LaunchError> {
        resolve_request(self.tracker, self.config, self.platform, entity_type, ids)
    }

    /// Resolve the request and open the file. Selection and path errors
    /// abort before anything is launched.
    pub fn launch_publish(&self, entity_type: &str, ids: &[i64]) -> Result<LaunchReport, LaunchError> {
        let (publish, path) = self.resolve_publish(entity_type, ids)?;

        let chain = DispatchChain {
            platform: self.platform,
            viewer_extensions: &self.config.viewer_extensions,
            viewer_path: self.config.viewer_path(self.platform),
            shell: self.shell,
            contexts: self.contexts,
            hook: self.hook,
        };
        let outcome = chain.dispatch(&path, &publish)?;

        Ok(LaunchReport {
            publish_id: publish.id,
            path,
            outcome,
        })
    }
}

/// Select the single publish behind `(entity_type, ids)` and resolve its path.
pub fn resolve_request(
    tracker: &dyn Tracker,
    config: &LauncherConfig,
    platform: Platform,
    entity_type: &str,
    ids: &[i64],
) -> Result<(PublishedFile, String), LaunchError> {
    let policy = config.selection_policy.policy();
    let selector = ArtifactSelector::new(
        tracker,
        config.published_file_entity_type,
        &config.viewer_extensions,
        policy.as_ref(),
        platform,
    );

    let publish = selector.select(entity_type, ids)?;
    let path = resolve_path(&publish, platform)?;
    Ok((publish, path))
}

/// What a surface asks the launcher to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub entity_type: String,
    pub selected_ids: Vec<i64>,
    #[serde(default)]
    pub permission_group: Option<String>,
}

/// Run the launch command against the tracking database with the system
/// shell and the configured launcher apps.
pub fn launch_with_database(
    db: &Database,
    config: &LauncherConfig,
    request: &LaunchRequest,
) -> Result<LaunchReport, LaunchError> {
    let platform = Platform::current()?;
    CommandRegistration::launch_publish(config)
        .check(platform, request.permission_group.as_deref())?;

    let shell = SystemShell::new(platform);
    let apps = ConfiguredApps::new(&config.launcher_apps, platform, &shell);
    let hook = AssociatedAppLauncher::new(&apps, db);

    let launcher = PublishLauncher {
        config,
        platform,
        tracker: db,
        contexts: db,
        shell: &shell,
        hook: &hook,
    };
    launcher.launch_publish(&request.entity_type, &request.selected_ids)
}

/// Selection and path resolution only; nothing is launched.
pub fn resolve_with_database(
    db: &Database,
    config: &LauncherConfig,
    request: &LaunchRequest,
) -> Result<(PublishedFile, String), LaunchError> {
    let platform = Platform::current()?;
    CommandRegistration::launch_publish(config)
        .check(platform, request.permission_group.as_deref())?;

    resolve_request(db, config, platform, &request.entity_type, &request.selected_ids)
}
