use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Platform, PublishedFileType};

const APP_NAME: &str = "publish-launcher";
const CONFIG_FILE: &str = "config.json";

/// Env var overriding the config file location.
pub const CONFIG_ENV: &str = "PUBLISH_LAUNCHER_CONFIG";

/// Settings for the launch pipeline, read once per process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Which publish schema the tracking site uses.
    pub published_file_entity_type: PublishedFileType,
    /// Extensions handed straight to the viewer, in priority order. The same
    /// list decides which publish wins when a version links to several.
    pub viewer_extensions: ExtensionPolicy,
    pub viewer_path_linux: Option<String>,
    pub viewer_path_mac: Option<String>,
    pub viewer_path_windows: Option<String>,
    /// What to do when no linked publish matches `viewer_extensions`.
    pub selection_policy: SelectionMode,
    /// Permission groups that may not run the launch command.
    pub deny_permissions: Vec<String>,
    /// Platforms on which the launch command is hidden.
    pub deny_platforms: Vec<Platform>,
    /// Launcher apps available for extension-based delegation, by app name.
    pub launcher_apps: BTreeMap<String, LauncherAppConfig>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            published_file_entity_type: PublishedFileType::PublishedFile,
            viewer_extensions: ExtensionPolicy::new([
                "jpeg", "jpg", "png", "exr", "dpx", "tif", "tiff", "mov", "mp4",
            ]),
            viewer_path_linux: None,
            viewer_path_mac: None,
            viewer_path_windows: None,
            selection_policy: SelectionMode::FirstMatchOrFirst,
            deny_permissions: Vec::new(),
            deny_platforms: Vec::new(),
            launcher_apps: BTreeMap::new(),
        }
    }
}

impl LauncherConfig {
    /// Load configuration from `path`, or from the default location when no
    /// path is given. Falls back to defaults if the file is missing or broken.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Ok(p.to_path_buf()),
            None => get_config_path(),
        };

        match path.and_then(|p| Self::try_load(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Configured viewer executable for `platform`. Empty strings count as
    /// unset.
    pub fn viewer_path(&self, platform: Platform) -> Option<&str> {
        let path = match platform {
            Platform::Linux => &self.viewer_path_linux,
            Platform::Mac => &self.viewer_path_mac,
            Platform::Windows => &self.viewer_path_windows,
        };
        path.as_deref().filter(|p| !p.is_empty())
    }
}

fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

/// Ordered list of file extensions, highest priority first.
///
/// Stored without the leading dot; `".mov"` and `"mov"` are the same entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionPolicy(Vec<String>);

impl ExtensionPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first extension, in priority order, that `path` ends with.
    pub fn matching(&self, path: &str) -> Option<&str> {
        self.iter().find(|ext| has_extension(path, ext))
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matching(path).is_some()
    }
}

impl From<Vec<String>> for ExtensionPolicy {
    fn from(extensions: Vec<String>) -> Self {
        Self::new(extensions)
    }
}

impl From<ExtensionPolicy> for Vec<String> {
    fn from(policy: ExtensionPolicy) -> Self {
        policy.0
    }
}

impl std::fmt::Display for ExtensionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Case-sensitive `.<ext>` suffix test.
pub fn has_extension(path: &str, ext: &str) -> bool {
    path.strip_suffix(ext)
        .is_some_and(|rest| rest.ends_with('.'))
}

/// Named choice between the two multi-publish selection behaviours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Return the first publish matching a viewer extension, else the first
    /// publish in link order.
    #[default]
    FirstMatchOrFirst,
    /// Return the first publish matching a viewer extension, else fail.
    Strict,
}

/// Per-platform executable for a launcher app.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherAppConfig {
    pub path_linux: Option<String>,
    pub path_mac: Option<String>,
    pub path_windows: Option<String>,
    /// Flag used to pass the launch context, e.g. `--context`. Apps without
    /// one only ever receive the file path.
    pub context_arg: Option<String>,
}

impl LauncherAppConfig {
    pub fn executable(&self, platform: Platform) -> Option<&str> {
        let path = match platform {
            Platform::Linux => &self.path_linux,
            Platform::Mac => &self.path_mac,
            Platform::Windows => &self.path_windows,
        };
        path.as_deref().filter(|p| !p.is_empty())
    }
}
