//! Pre-release counters for chained pre-release versions
//!
//! A pre-release suffix such as `alpha3` or `beta.7` is read as an identifier
//! (`alpha`, `beta.`) followed by a numeric counter. Each pre-release in a
//! chain bumps the counter by one while keeping the base version.

use regex::Regex;
use semver::Version;
use std::fmt;
use std::sync::LazyLock;

static SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^0-9]+)([0-9]+)").expect("valid suffix pattern"));

/// Identifier used when a suffix carries none
pub const DEFAULT_IDENTIFIER: &str = "alpha";

/// Pre-release identifier with its counter
///
/// # Examples
/// - "alpha3" -> PreRelease { identifier: "alpha", counter: 3 }
/// - "beta.7" -> PreRelease { identifier: "beta.", counter: 7 }
/// - "rc" -> PreRelease { identifier: "alpha", counter: 0 } (no counter to read)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub identifier: String,
    pub counter: u64,
}

impl PreRelease {
    pub fn new(identifier: impl Into<String>, counter: u64) -> Self {
        PreRelease {
            identifier: identifier.into(),
            counter,
        }
    }

    /// Read identifier and counter from a suffix
    ///
    /// Never fails: a missing or unreadable suffix falls back to
    /// `alpha` with counter 0.
    pub fn parse_lenient(suffix: Option<&str>) -> Self {
        suffix
            .and_then(|s| SUFFIX_RE.captures(s))
            .and_then(|captures| {
                let identifier = captures.get(1)?.as_str();
                let counter = captures.get(2)?.as_str().parse::<u64>().ok()?;
                Some(PreRelease::new(identifier, counter))
            })
            .unwrap_or_else(|| PreRelease::new(DEFAULT_IDENTIFIER, 0))
    }

    /// Increment the counter
    pub fn increment(&self) -> Self {
        PreRelease {
            identifier: self.identifier.clone(),
            counter: self.counter.saturating_add(1),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.identifier, self.counter)
    }
}

/// Next version in a pre-release chain
///
/// `1.0.0-alpha2` becomes `1.0.0-alpha3`, `1.0.0-beta.7` becomes
/// `1.0.0-beta.8`, and a version without a readable counter such as
/// `1.2.0` becomes `1.2.0-alpha1`.
pub fn next_prerelease(version: &str) -> String {
    let mut parts = version.split('-');
    let base = parts.next().unwrap_or_default();
    let next = PreRelease::parse_lenient(parts.next()).increment();
    format!("{}-{}", base, next)
}

/// Same as [`next_prerelease`] for an already parsed version
pub fn next_prerelease_of(version: &Version) -> String {
    next_prerelease(&version.to_string())
}
