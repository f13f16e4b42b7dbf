use crate::error::{ChangelogError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Semantic version component to increment, ordered `Patch < Minor < Major`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpLevel::Major => write!(f, "major"),
            BumpLevel::Minor => write!(f, "minor"),
            BumpLevel::Patch => write!(f, "patch"),
        }
    }
}

/// Parse a version string, tolerating a leading `v` or `=`
///
/// Returns `None` for anything that is not a valid semantic version
/// (e.g. "1.2", "v1.2.3.4", "latest").
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let clean = raw.trim().trim_start_matches(['v', 'V', '=']).trim();
    Version::parse(clean).ok()
}

/// Whether the version sorts below 1.0.0 (so `1.0.0-rc.1` counts)
pub fn is_pre_major(version: &Version) -> bool {
    version.cmp_precedence(&Version::new(1, 0, 0)).is_lt()
}

/// Apply a bump level to a version
///
/// Follows the usual reset rules (major resets minor and patch, minor resets
/// patch). A pre-release is promoted to its release when the bump would not
/// move past it: `1.0.0-alpha1` bumped by patch, minor or major gives `1.0.0`,
/// and `1.2.0-rc1` bumped by minor gives `1.2.0`. Build metadata is dropped.
pub fn increment(version: &Version, level: BumpLevel) -> Result<Version> {
    let overflow = || {
        ChangelogError::malformed_version(format!("cannot apply {} bump to {}", level, version))
    };
    let pre = !version.pre.is_empty();

    let (major, minor, patch) = match level {
        BumpLevel::Major => {
            if pre && version.minor == 0 && version.patch == 0 {
                (version.major, 0, 0)
            } else {
                (version.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
            }
        }
        BumpLevel::Minor => {
            if pre && version.patch == 0 {
                (version.major, version.minor, 0)
            } else {
                (
                    version.major,
                    version.minor.checked_add(1).ok_or_else(overflow)?,
                    0,
                )
            }
        }
        BumpLevel::Patch => {
            if pre {
                (version.major, version.minor, version.patch)
            } else {
                (
                    version.major,
                    version.minor,
                    version.patch.checked_add(1).ok_or_else(overflow)?,
                )
            }
        }
    };

    Ok(Version {
        major,
        minor,
        patch,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    })
}
