use crate::boundary::BoundaryWarning;
use crate::domain::tag::compare_versions;
use crate::domain::version::parse_lenient;
use crate::domain::Tag;
use crate::error::Result;
use crate::remote::{HistoryClient, HistoryTransport, TagRef};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Finds the release tag a new version should be computed from
pub struct TagResolver<'a, T> {
    client: &'a HistoryClient<T>,
}

impl<'a, T: HistoryTransport> TagResolver<'a, T> {
    pub fn new(client: &'a HistoryClient<T>) -> Self {
        TagResolver { client }
    }

    /// Latest released tag
    ///
    /// With `exact_match` the tag whose version equals it is returned and
    /// neither `prefix` nor `include_prerelease` apply. Otherwise tags are
    /// narrowed to `prefix`, pre-releases are dropped unless asked for, and
    /// the highest version wins.
    pub async fn latest_tag(
        &self,
        prefix: Option<&str>,
        include_prerelease: bool,
        exact_match: Option<&str>,
    ) -> Result<Option<Tag>> {
        let refs = self.client.all_tags().await?;

        let found = match exact_match {
            Some(wanted) => find_exact(&build_tag_map(refs, None), wanted),
            None => select_latest(&build_tag_map(refs, prefix), include_prerelease),
        };
        match &found {
            Some(tag) => debug!(tag = %tag.name, sha = %tag.sha, "resolved tag"),
            None => debug!(?prefix, ?exact_match, "no matching tag"),
        }
        Ok(found)
    }
}

/// Index tags by normalized version, discarding names that are not versions
///
/// When two names resolve to the same version the one listed later wins.
pub fn build_tag_map(refs: Vec<TagRef>, prefix: Option<&str>) -> BTreeMap<String, Tag> {
    let mut tags: BTreeMap<String, Tag> = BTreeMap::new();

    for tag_ref in refs {
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            if !tag_ref.name.starts_with(prefix) {
                continue;
            }
        }
        let Some(tag) = Tag::from_name(&tag_ref.name, &tag_ref.sha, prefix) else {
            let warning = BoundaryWarning::UnparsableTag { tag: tag_ref.name };
            debug!(%warning);
            continue;
        };
        if let Some(previous) = tags.insert(tag.version.to_string(), tag.clone()) {
            let warning = BoundaryWarning::DuplicateVersion {
                tag: previous.name,
                replaced_by: tag.name,
            };
            warn!(%warning);
        }
    }
    tags
}

/// Highest version under the padded pre-release ordering
pub fn select_latest(tags: &BTreeMap<String, Tag>, include_prerelease: bool) -> Option<Tag> {
    tags.values()
        .filter(|tag| include_prerelease || !tag.is_prerelease())
        .max_by(|a, b| compare_versions(&a.version, &b.version))
        .cloned()
}

/// Tag whose version equals `wanted` (a leading `v` is allowed)
pub fn find_exact(tags: &BTreeMap<String, Tag>, wanted: &str) -> Option<Tag> {
    let version = parse_lenient(wanted)?;
    tags.get(&version.to_string()).cloned()
}
