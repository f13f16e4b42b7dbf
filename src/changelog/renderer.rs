use crate::changelog::sections::{group_commits, Entry, SectionLayout};
use crate::domain::commit::short_sha;
use crate::domain::{ClassifiedCommit, Commit, Reference};
use crate::error::Result;
use handlebars::{no_escape, Handlebars};
use serde::Serialize;

pub const DEFAULT_HOST: &str = "https://www.github.com";

const MAIN: &str = "main";
const HEADER: &str = "header";
const COMMIT: &str = "commit";

const MAIN_TEMPLATE: &str = "{{> header}}{{#each sections}}\n\n### {{title}}\n{{#each commits}}{{> commit}}{{/each}}{{/each}}";

const HEADER_PARTIAL: &str = "{{#if compare_url}}## [{{version}}]({{compare_url}}){{else}}## {{version}}{{/if}}{{#if date}} ({{date}}){{/if}}";

const COMMIT_PARTIAL: &str = "\n* {{#if scope}}**{{scope}}:** {{/if}}{{text}}{{#if hash}} ([{{short_hash}}]({{commit_url}})){{/if}}{{#if references}}, closes {{#each references}}{{#unless @first}}, {{/unless}}[{{label}}]({{url}}){{/each}}{{/if}}";

/// Where and what is being released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogContext {
    pub host: String,
    pub owner: String,
    pub repository: String,
    pub version: String,
    pub previous_tag: Option<String>,
    pub current_tag: String,
    pub link_compare: bool,
    /// Shown next to the version when set
    pub date: Option<String>,
}

impl ChangelogContext {
    fn repository_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.host.trim_end_matches('/'),
            self.owner,
            self.repository
        )
    }

    fn compare_url(&self) -> Option<String> {
        let previous = self.previous_tag.as_ref().filter(|_| self.link_compare)?;
        Some(format!(
            "{}/compare/{}...{}",
            self.repository_url(),
            previous,
            self.current_tag
        ))
    }
}

/// Template overrides; unset fields keep the built-in layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Templates {
    pub main: Option<String>,
    pub header: Option<String>,
    pub commit: Option<String>,
}

#[derive(Serialize)]
struct RenderData<'a> {
    host: &'a str,
    owner: &'a str,
    repository: &'a str,
    version: &'a str,
    previous_tag: Option<&'a str>,
    current_tag: &'a str,
    date: Option<&'a str>,
    compare_url: Option<String>,
    sections: Vec<RenderedSection>,
}

#[derive(Serialize)]
struct RenderedSection {
    title: String,
    commits: Vec<RenderedEntry>,
}

#[derive(Serialize)]
struct RenderedEntry {
    scope: Option<String>,
    text: String,
    hash: Option<String>,
    short_hash: Option<String>,
    commit_url: Option<String>,
    references: Vec<RenderedReference>,
}

#[derive(Serialize)]
struct RenderedReference {
    label: String,
    url: String,
}

/// Turns classified commits into markdown
pub struct ChangelogRenderer {
    registry: Handlebars<'static>,
    layout: SectionLayout,
}

impl ChangelogRenderer {
    /// Renderer with the built-in templates
    pub fn new(layout: SectionLayout) -> Result<Self> {
        Self::with_templates(layout, &Templates::default())
    }

    pub fn with_templates(layout: SectionLayout, templates: &Templates) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_template_string(
            MAIN,
            templates.main.as_deref().unwrap_or(MAIN_TEMPLATE),
        )?;
        registry.register_partial(
            HEADER,
            templates.header.as_deref().unwrap_or(HEADER_PARTIAL),
        )?;
        registry.register_partial(
            COMMIT,
            templates.commit.as_deref().unwrap_or(COMMIT_PARTIAL),
        )?;
        Ok(ChangelogRenderer { registry, layout })
    }

    /// Render the changelog body for `commits` (newest first)
    pub fn render(&self, commits: &[Commit], context: &ChangelogContext) -> Result<String> {
        let classified: Vec<ClassifiedCommit> =
            commits.iter().map(ClassifiedCommit::parse).collect();
        let repository_url = context.repository_url();

        let sections = group_commits(classified, &self.layout)
            .into_iter()
            .map(|section| RenderedSection {
                title: section.title,
                commits: section
                    .entries
                    .into_iter()
                    .map(|entry| render_entry(entry, context, &repository_url))
                    .collect(),
            })
            .collect();

        let data = RenderData {
            host: &context.host,
            owner: &context.owner,
            repository: &context.repository,
            version: &context.version,
            previous_tag: context.previous_tag.as_deref(),
            current_tag: &context.current_tag,
            date: context.date.as_deref(),
            compare_url: context.compare_url(),
            sections,
        };

        let rendered = self.registry.render(MAIN, &data)?;
        Ok(rendered.trim().to_string())
    }
}

fn render_entry(entry: Entry, context: &ChangelogContext, repository_url: &str) -> RenderedEntry {
    let (hash, short_hash, commit_url, references) = match entry.commit {
        Some(commit) => {
            let short = short_sha(&commit.sha).to_string();
            let url = format!("{}/commit/{}", repository_url, commit.sha);
            let references = commit
                .references
                .iter()
                .map(|r| render_reference(r, context))
                .collect();
            (Some(commit.sha), Some(short), Some(url), references)
        }
        None => (None, None, None, Vec::new()),
    };
    RenderedEntry {
        scope: entry.scope,
        text: entry.text,
        hash,
        short_hash,
        commit_url,
        references,
    }
}

fn render_reference(reference: &Reference, context: &ChangelogContext) -> RenderedReference {
    let owner = reference.owner.as_deref().unwrap_or(&context.owner);
    let repository = reference.repository.as_deref().unwrap_or(&context.repository);
    let label = match (&reference.owner, &reference.repository) {
        (Some(owner), Some(repository)) => format!("{}/{}#{}", owner, repository, reference.issue),
        _ => format!("#{}", reference.issue),
    };
    RenderedReference {
        label,
        url: format!(
            "{}/{}/{}/issues/{}",
            context.host.trim_end_matches('/'),
            owner,
            repository,
            reference.issue
        ),
    }
}
