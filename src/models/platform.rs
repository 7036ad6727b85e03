use serde::{Deserialize, Serialize};

use crate::error::LaunchError;

/// One of the three host platforms the launcher knows how to drive.
///
/// Detected once at the boundary; everything downstream branches on this
/// value rather than on `cfg!` checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    Mac,
    Windows,
}

impl Platform {
    /// The platform this binary is running on.
    pub fn current() -> Result<Self, LaunchError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name onto a supported platform.
    pub fn from_os(os: &str) -> Result<Self, LaunchError> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Mac),
            "windows" => Ok(Self::Windows),
            other => Err(LaunchError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_operating_systems() {
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::Mac);
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
    }

    #[test]
    fn rejects_other_operating_systems() {
        let err = Platform::from_os("freebsd").unwrap_err();
        assert!(matches!(err, LaunchError::UnsupportedPlatform(ref os) if os == "freebsd"));
        assert_eq!(err.to_string(), "Platform 'freebsd' is not supported");
    }
}
