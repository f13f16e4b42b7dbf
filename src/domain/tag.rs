use crate::domain::version;
use regex::Regex;
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::sync::LazyLock;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digits pattern"));

/// Width pre-release counters are padded to before comparison
const COUNTER_WIDTH: usize = 6;

/// A released version tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub sha: String,
    pub version: Version,
}

impl Tag {
    /// Build a tag from its name, stripping `prefix` first
    ///
    /// Returns `None` when the name does not carry the prefix or the rest is
    /// not a semantic version.
    pub fn from_name(name: &str, sha: &str, prefix: Option<&str>) -> Option<Self> {
        let remainder = match prefix {
            Some(prefix) if !prefix.is_empty() => name.strip_prefix(prefix)?,
            _ => name,
        };
        let version = version::parse_lenient(remainder)?;
        Some(Tag {
            name: name.to_string(),
            sha: sha.to_string(),
            version,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }
}

/// Version used for ordering tags
///
/// The first counter embedded in an alphanumeric pre-release identifier is
/// left-padded to six digits so that `alpha10` ranks above `alpha2`. Purely
/// numeric identifiers (`alpha.10`) already compare numerically and are left
/// alone.
pub fn ordering_key(version: &Version) -> Version {
    let mut key = Version::new(version.major, version.minor, version.patch);
    if version.pre.is_empty() {
        return key;
    }

    let mut identifiers: Vec<String> = version.pre.split('.').map(str::to_string).collect();
    if let Some(position) = identifiers
        .iter()
        .position(|id| id.chars().any(|c| c.is_ascii_digit()))
    {
        let identifier = &identifiers[position];
        if !identifier.chars().all(|c| c.is_ascii_digit()) {
            identifiers[position] = pad_first_counter(identifier);
        }
    }

    key.pre = Prerelease::new(&identifiers.join(".")).unwrap_or_else(|_| version.pre.clone());
    key
}

fn pad_first_counter(identifier: &str) -> String {
    match DIGITS_RE.find(identifier) {
        Some(digits) => format!(
            "{}{:0>width$}{}",
            &identifier[..digits.start()],
            digits.as_str(),
            &identifier[digits.end()..],
            width = COUNTER_WIDTH
        ),
        None => identifier.to_string(),
    }
}

/// Compare two versions under the padded pre-release ordering
///
/// Versions whose keys tie fall back to plain semver precedence so the order
/// stays total.
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
    ordering_key(a)
        .cmp_precedence(&ordering_key(b))
        .then_with(|| a.cmp_precedence(b))
        .then_with(|| a.cmp(b))
}
