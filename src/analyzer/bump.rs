use crate::domain::{filter_reverted, BumpLevel, ClassifiedCommit};
use std::fmt;

/// Outcome of reducing a commit set to a bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub level: BumpLevel,
    pub breaking_changes: usize,
    pub features: usize,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bump: {} breaking change{} and {} feature{}",
            self.level,
            self.breaking_changes,
            if self.breaking_changes == 1 { "" } else { "s" },
            self.features,
            if self.features == 1 { "" } else { "s" }
        )
    }
}

/// Reduces classified commits to a single bump level
pub struct BumpRecommender;

impl BumpRecommender {
    /// Highest severity in the set: breaking > feature > anything else
    ///
    /// Reverted commits and the reverts themselves are ignored. With
    /// `pre_major`, a set that would only warrant a patch but contains a
    /// feature is escalated to minor.
    pub fn analyze(commits: &[ClassifiedCommit], pre_major: bool) -> Recommendation {
        let effective = filter_reverted(commits.to_vec());

        let breaking_changes: usize = effective.iter().map(|c| c.breaking_notes.len()).sum();
        let features = effective.iter().filter(|c| c.is_feature()).count();

        let mut level = if breaking_changes > 0 {
            BumpLevel::Major
        } else if features > 0 {
            BumpLevel::Minor
        } else {
            BumpLevel::Patch
        };

        if pre_major && level == BumpLevel::Patch && features > 0 {
            level = BumpLevel::Minor;
        }

        Recommendation {
            level,
            breaking_changes,
            features,
        }
    }

    pub fn recommend(commits: &[ClassifiedCommit], pre_major: bool) -> BumpLevel {
        Self::analyze(commits, pre_major).level
    }
}
