//! Shell command shapes for each launch strategy, keyed by platform.
//!
//! Everything here is pure so the exact command strings can be tested
//! without spawning anything. Paths are double-quoted; on Unix the
//! characters `sh` still expands inside double quotes are escaped. Windows
//! paths cannot contain `"`, but `cmd` still expands `%VAR%` inside them.

use crate::error::LaunchError;
use crate::models::Platform;

/// A strategy that turns a file path into one shell command.
pub trait LaunchStrategy {
    fn command(&self, platform: Platform, path: &str) -> Result<String, LaunchError>;
}

/// Open with whatever the OS associates with the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOpen;

/// Open with the viewer executable configured for the platform.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredViewer<'a> {
    pub app_path: Option<&'a str>,
}

impl LaunchStrategy for DefaultOpen {
    fn command(&self, platform: Platform, path: &str) -> Result<String, LaunchError> {
        Ok(default_open_command(platform, path))
    }
}

impl LaunchStrategy for ConfiguredViewer<'_> {
    fn command(&self, platform: Platform, path: &str) -> Result<String, LaunchError> {
        let app_path = self
            .app_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| LaunchError::MissingViewerConfiguration(platform.to_string()))?;
        Ok(app_command(platform, "Viewer", app_path, path))
    }
}

/// Wrap `value` in double quotes for the platform shell.
pub fn quoted(platform: Platform, value: &str) -> String {
    match platform {
        Platform::Windows => format!("\"{}\"", value),
        Platform::Linux | Platform::Mac => {
            let mut out = String::with_capacity(value.len() + 2);
            out.push('"');
            for c in value.chars() {
                if matches!(c, '"' | '\\' | '$' | '`') {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
            out
        }
    }
}

pub fn default_open_command(platform: Platform, path: &str) -> String {
    let path = quoted(platform, path);
    match platform {
        Platform::Linux => format!("xdg-open {}", path),
        Platform::Mac => format!("open {}", path),
        Platform::Windows => format!("cmd.exe /C start \"file\" {}", path),
    }
}

/// Start `app_path` detached with `path` as its only argument. `title` is the
/// window title Windows' `start` insists on.
pub fn app_command(platform: Platform, title: &str, app_path: &str, path: &str) -> String {
    let path = quoted(platform, path);
    match platform {
        Platform::Linux => format!("{} {} &", app_path, path),
        Platform::Mac => format!("open -n {} --args {}", quoted(platform, app_path), path),
        Platform::Windows => format!(
            "start /B \"{}\" {} {}",
            title,
            quoted(platform, app_path),
            path
        ),
    }
}

/// Like [`app_command`] with an extra `<flag> "<value>"` argument pair.
pub fn app_command_with_arg(
    platform: Platform,
    title: &str,
    app_path: &str,
    path: &str,
    flag: &str,
    value: &str,
) -> String {
    let args = format!(
        "{} {} {}",
        quoted(platform, path),
        flag,
        quoted(platform, value)
    );
    match platform {
        Platform::Linux => format!("{} {} &", app_path, args),
        Platform::Mac => format!("open -n {} --args {}", quoted(platform, app_path), args),
        Platform::Windows => format!(
            "start /B \"{}\" {} {}",
            title,
            quoted(platform, app_path),
            args
        ),
    }
}
