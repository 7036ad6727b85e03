//! Turning a published file record into a path on the local disk.

use crate::error::LaunchError;
use crate::models::{Platform, PublishedFile};

/// Local path of `publish` on `platform`.
///
/// A non-empty `local_path` wins and is returned untouched. Otherwise the
/// `file://` URL written by zero-config publishes is percent-decoded and its
/// scheme stripped.
pub fn resolve_path(publish: &PublishedFile, platform: Platform) -> Result<String, LaunchError> {
    if let Some(local) = publish.path.local_path.as_deref().filter(|p| !p.is_empty()) {
        return Ok(local.to_string());
    }

    match publish.path.url.as_deref() {
        Some(url) => Ok(path_from_file_url(url, platform)),
        None => Err(LaunchError::PathNotResolvable(publish.id)),
    }
}

/// Resolve a path without failing; used when scanning candidates.
pub fn try_resolve_path(publish: &PublishedFile, platform: Platform) -> Option<String> {
    resolve_path(publish, platform).ok()
}

/// `file:///E:/a%20b.jpg` becomes `E:/a b.jpg` on Windows; elsewhere
/// `file:///a%20b.jpg` becomes `/a b.jpg`.
pub fn path_from_file_url(url: &str, platform: Platform) -> String {
    let decoded = percent_decode(url);
    let prefix = match platform {
        Platform::Windows => "file:///",
        Platform::Linux | Platform::Mac => "file://",
    };
    match decoded.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Decode `%XX` escapes. Strings without a `%` come back unchanged, as do
/// strings whose escapes do not form valid UTF-8.
pub fn percent_decode(s: &str) -> String {
    if !s.contains('%') {
        return s.to_string();
    }
    match urlencoding::decode(s) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::debug!("Leaving '{}' undecoded: {}", s, e);
            s.to_string()
        }
    }
}
