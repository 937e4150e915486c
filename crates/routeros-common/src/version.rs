//! RouterOS firmware version parsing.
//!
//! Versions are folded into a single `u32` so that behavior can branch on
//! "device version >= X" with plain integer comparison:
//!
//! ```text
//! major << 24 | minor << 16 | patch << 8 | stage
//! ```
//!
//! `stage` orders pre-releases below the final release of the same number:
//! `betaN` encodes as `N`, `rcN` as `0x80 + N`, a release as `0xFF`.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RosError, RosResult};

/// Accepts "7.19", "7.16.2", "7.20beta3", "7.19rc1 (testing)", "6.49.17 (long-term)".
static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\.(\d+)(?:\.(\d+))?(?:(beta|rc)(\d+))?(?:\s+\([A-Za-z\- ]+\))?\s*$")
        .expect("Invalid regex pattern")
});

const STAGE_RELEASE: u32 = 0xFF;
const STAGE_RC_BASE: u32 = 0x80;
const MAX_BETA: u32 = STAGE_RC_BASE - 1;
const MAX_RC: u32 = STAGE_RELEASE - STAGE_RC_BASE - 1;

/// A parsed, totally ordered RouterOS version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RosVersion(u32);

impl RosVersion {
    /// Creates a release version (no beta/rc suffix).
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self((major as u32) << 24 | (minor as u32) << 16 | (patch as u32) << 8 | STAGE_RELEASE)
    }

    /// Parses a version string as reported by `/system/resource`.
    pub fn parse(input: &str) -> RosResult<Self> {
        let caps = VERSION_RE
            .captures(input)
            .ok_or_else(|| RosError::version_parse(input, "expected MAJOR.MINOR[.PATCH]"))?;

        let segment = |idx: usize, name: &str| -> RosResult<u32> {
            match caps.get(idx) {
                None => Ok(0),
                Some(m) => {
                    let value: u32 = m.as_str().parse().map_err(|_| {
                        RosError::version_parse(input, format!("{} segment is too large", name))
                    })?;
                    if value > 0xFF {
                        return Err(RosError::version_parse(
                            input,
                            format!("{} segment {} exceeds 255", name, value),
                        ));
                    }
                    Ok(value)
                }
            }
        };

        let major = segment(1, "major")?;
        let minor = segment(2, "minor")?;
        let patch = segment(3, "patch")?;

        let stage = match caps.get(4).map(|m| m.as_str()) {
            None => STAGE_RELEASE,
            Some(kind) => {
                let n = segment(5, kind)?;
                match kind {
                    "beta" if n <= MAX_BETA => n,
                    "rc" if n <= MAX_RC => STAGE_RC_BASE + n,
                    _ => {
                        return Err(RosError::version_parse(
                            input,
                            format!("{} number {} out of range", kind, n),
                        ))
                    }
                }
            }
        };

        Ok(Self(major << 24 | minor << 16 | patch << 8 | stage))
    }

    /// Returns the comparable integer encoding.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Major version number.
    pub fn major(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Minor version number.
    pub fn minor(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Patch version number (0 when absent).
    pub fn patch(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Returns true for beta and release-candidate builds.
    pub fn is_prerelease(&self) -> bool {
        self.0 & 0xFF != STAGE_RELEASE
    }
}

impl FromStr for RosVersion {
    type Err = RosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RosVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())?;
        if self.patch() != 0 {
            write!(f, ".{}", self.patch())?;
        }
        let stage = self.0 & 0xFF;
        match stage {
            STAGE_RELEASE => Ok(()),
            s if s >= STAGE_RC_BASE => write!(f, "rc{}", s - STAGE_RC_BASE),
            s => write!(f, "beta{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> RosVersion {
        RosVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_release() {
        let ver = v("7.19");
        assert_eq!(ver.major(), 7);
        assert_eq!(ver.minor(), 19);
        assert_eq!(ver.patch(), 0);
        assert!(!ver.is_prerelease());
        assert_eq!(ver, RosVersion::new(7, 19, 0));
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert!(v("7.19") > v("7.16"));
        assert!(v("7.16") > v("7.9"));
        assert!(v("7.10") > v("7.9"));
        assert!(v("7.16.2") > v("7.16"));
        assert!(v("7.17") > v("7.16.2"));
        assert!(v("7.0") > v("6.49.17"));
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(v("7.19") > v("7.19rc2"));
        assert!(v("7.19rc2") > v("7.19rc1"));
        assert!(v("7.19rc1") > v("7.19beta9"));
        assert!(v("7.19beta9") > v("7.19beta2"));
        assert!(v("7.19beta2") > v("7.18.2"));
    }

    #[test]
    fn test_channel_suffix_is_ignored() {
        assert_eq!(v("7.16.2 (stable)"), v("7.16.2"));
        assert_eq!(v("6.49.17 (long-term)"), v("6.49.17"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(RosVersion::parse("").is_err());
        assert!(RosVersion::parse("7").is_err());
        assert!(RosVersion::parse("seven.nineteen").is_err());
        assert!(RosVersion::parse("7.19.x").is_err());
        assert!(RosVersion::parse("7.256").is_err());
        assert!(RosVersion::parse("7.19beta200").is_err());

        match RosVersion::parse("latest") {
            Err(RosError::VersionParse { input, .. }) => assert_eq!(input, "latest"),
            other => panic!("Expected VersionParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(v("7.19").to_string(), "7.19");
        assert_eq!(v("7.16.2").to_string(), "7.16.2");
        assert_eq!(v("7.20beta3").to_string(), "7.20beta3");
        assert_eq!(v("7.19rc1 (testing)").to_string(), "7.19rc1");
    }

    #[test]
    fn test_from_str() {
        let ver: RosVersion = "7.19".parse().unwrap();
        assert_eq!(ver.as_u32(), RosVersion::new(7, 19, 0).as_u32());
    }
}
