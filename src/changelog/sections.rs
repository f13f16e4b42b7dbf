use crate::domain::{filter_reverted, ClassifiedCommit};
use serde::{Deserialize, Serialize};

pub const BREAKING_TITLE: &str = "⚠ BREAKING CHANGES";
pub const OTHER_TITLE: &str = "Other Changes";

/// Maps a commit type to the section it is listed under
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SectionConfig {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub section: String,
    #[serde(default)]
    pub hidden: bool,
}

impl SectionConfig {
    pub fn new(commit_type: &str, section: &str, hidden: bool) -> Self {
        SectionConfig {
            commit_type: commit_type.to_string(),
            section: section.to_string(),
            hidden,
        }
    }

    /// Conventional commits defaults, in the order sections are rendered
    pub fn defaults() -> Vec<SectionConfig> {
        vec![
            SectionConfig::new("feat", "Features", false),
            SectionConfig::new("feature", "Features", false),
            SectionConfig::new("fix", "Bug Fixes", false),
            SectionConfig::new("perf", "Performance Improvements", false),
            SectionConfig::new("revert", "Reverts", false),
            SectionConfig::new("docs", "Documentation", true),
            SectionConfig::new("style", "Styles", true),
            SectionConfig::new("chore", "Miscellaneous Chores", true),
            SectionConfig::new("refactor", "Code Refactoring", true),
            SectionConfig::new("test", "Tests", true),
            SectionConfig::new("build", "Build System", true),
            SectionConfig::new("ci", "Continuous Integration", true),
        ]
    }
}

/// How commits are distributed over sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub sections: Vec<SectionConfig>,
    pub breaking_title: String,
    pub other_title: String,
    pub hide_other: bool,
}

impl Default for SectionLayout {
    fn default() -> Self {
        SectionLayout {
            sections: SectionConfig::defaults(),
            breaking_title: BREAKING_TITLE.to_string(),
            other_title: OTHER_TITLE.to_string(),
            hide_other: false,
        }
    }
}

/// One line under a section heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub scope: Option<String>,
    pub text: String,
    /// Unset for breaking notes, which do not link back to a commit
    pub commit: Option<ClassifiedCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

/// Group classified commits under their section titles
///
/// Breaking notes come first, then sections in configured order, then the
/// bucket for commits without a type. Empty and hidden sections are left out;
/// commits keep their input order inside a section. Commits with a type that
/// has no configured section are dropped, as are reverted commits together
/// with their reverts.
pub fn group_commits(commits: Vec<ClassifiedCommit>, layout: &SectionLayout) -> Vec<Section> {
    let commits = filter_reverted(commits);

    let mut breaking = Section {
        title: layout.breaking_title.clone(),
        entries: Vec::new(),
    };
    let mut sections: Vec<Section> = Vec::new();
    for config in layout.sections.iter().filter(|c| !c.hidden) {
        if !sections.iter().any(|s| s.title == config.section) {
            sections.push(Section {
                title: config.section.clone(),
                entries: Vec::new(),
            });
        }
    }
    let mut other = Section {
        title: layout.other_title.clone(),
        entries: Vec::new(),
    };

    for commit in commits {
        for note in &commit.breaking_notes {
            breaking.entries.push(Entry {
                scope: commit.scope.clone(),
                text: note.clone(),
                commit: None,
            });
        }

        let target = match commit.r#type.as_deref() {
            None if layout.hide_other => None,
            None => Some(&mut other),
            Some(kind) => layout
                .sections
                .iter()
                .find(|c| c.commit_type.eq_ignore_ascii_case(kind))
                .filter(|c| !c.hidden)
                .and_then(|c| sections.iter_mut().find(|s| s.title == c.section)),
        };
        if let Some(section) = target {
            section.entries.push(Entry {
                scope: commit.scope.clone(),
                text: commit.subject.clone().unwrap_or_else(|| commit.header.clone()),
                commit: Some(commit),
            });
        }
    }

    std::iter::once(breaking)
        .chain(sections)
        .chain(std::iter::once(other))
        .filter(|section| !section.entries.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Commit;

    fn classify(messages: &[&str]) -> Vec<ClassifiedCommit> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| ClassifiedCommit::parse(&Commit::new(format!("{:040x}", i + 1), *m)))
            .collect()
    }

    fn titles(sections: &[Section]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_priority_order_not_first_seen() {
        let sections = group_commits(
            classify(&["fix: a", "perf: b", "feat: c"]),
            &SectionLayout::default(),
        );
        assert_eq!(
            titles(&sections),
            vec!["Features", "Bug Fixes", "Performance Improvements"]
        );
    }

    #[test]
    fn test_breaking_section_first() {
        let sections = group_commits(
            classify(&["fix: a", "feat(api)!: drop v1 endpoints"]),
            &SectionLayout::default(),
        );
        assert_eq!(titles(&sections), vec![BREAKING_TITLE, "Features", "Bug Fixes"]);
        assert_eq!(sections[0].entries[0].text, "drop v1 endpoints");
        assert_eq!(sections[0].entries[0].scope.as_deref(), Some("api"));
    }

    #[test]
    fn test_hidden_and_empty_sections_omitted() {
        let sections = group_commits(
            classify(&["docs: readme", "chore: deps", "fix: bug"]),
            &SectionLayout::default(),
        );
        assert_eq!(titles(&sections), vec!["Bug Fixes"]);
    }

    #[test]
    fn test_feature_alias_shares_section() {
        let sections = group_commits(
            classify(&["feat: a", "feature: b"]),
            &SectionLayout::default(),
        );
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].entries.len(), 2);
    }

    #[test]
    fn test_insertion_order_kept() {
        let sections = group_commits(
            classify(&["fix: newest", "fix: middle", "fix: oldest"]),
            &SectionLayout::default(),
        );
        let texts: Vec<&str> = sections[0].entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_untyped_commits_go_to_other() {
        let sections = group_commits(
            classify(&["Update README", "fix: bug"]),
            &SectionLayout::default(),
        );
        assert_eq!(titles(&sections), vec!["Bug Fixes", OTHER_TITLE]);
        assert_eq!(sections[1].entries[0].text, "Update README");

        let layout = SectionLayout {
            hide_other: true,
            ..SectionLayout::default()
        };
        let sections = group_commits(classify(&["Update README"]), &layout);
        assert!(sections.is_empty());
    }

    #[test]
    fn test_unknown_type_dropped() {
        let sections = group_commits(classify(&["wip: half done"]), &SectionLayout::default());
        assert!(sections.is_empty());
    }

    #[test]
    fn test_custom_mapping() {
        let layout = SectionLayout {
            sections: vec![
                SectionConfig::new("fix", "Fixes", false),
                SectionConfig::new("docs", "Docs", false),
            ],
            ..SectionLayout::default()
        };
        let sections = group_commits(classify(&["feat: x", "docs: y", "fix: z"]), &layout);
        assert_eq!(titles(&sections), vec!["Fixes", "Docs"]);
    }

    #[test]
    fn test_multiline_breaking_note_keeps_first_line() {
        let sections = group_commits(
            classify(&["fix: x\n\nBREAKING CHANGE: first line\nsecond line\n\nmore"]),
            &SectionLayout::default(),
        );
        assert_eq!(sections[0].title, BREAKING_TITLE);
        assert_eq!(sections[0].entries[0].text, "first line");
    }
}
