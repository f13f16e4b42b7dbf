use crate::analyzer::CandidateOptions;
use crate::changelog::sections::{SectionConfig, BREAKING_TITLE, OTHER_TITLE};
use crate::changelog::{renderer::DEFAULT_HOST, SectionLayout, Templates};
use crate::error::{ChangelogError, Result};
use crate::remote::github::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete configuration for git-changelog.
///
/// Contains remote access settings, versioning rules and changelog layout.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_breaking_title() -> String {
    BREAKING_TITLE.to_string()
}

fn default_other_title() -> String {
    OTHER_TITLE.to_string()
}

/// Access to the hosting API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL for links in the rendered changelog
    #[serde(default = "default_host")]
    pub host: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub proxy_key: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between retries of a failed page request; 0 retries immediately
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: default_api_url(),
            host: default_host(),
            token_env: default_token_env(),
            proxy_key: None,
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_delay_ms: 0,
        }
    }
}

impl GitHubConfig {
    /// Token read from the configured environment variable, if set and non-empty
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Rules for choosing the next version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersioningConfig {
    /// Features bump minor instead of patch while below 1.0.0
    #[serde(default = "default_true")]
    pub bump_minor_pre_major: bool,

    /// Only tags starting with this prefix are considered (monorepos)
    #[serde(default)]
    pub tag_prefix: Option<String>,

    #[serde(default)]
    pub include_prerelease: bool,

    /// Continue a pre-release chain instead of bumping
    #[serde(default)]
    pub prerelease: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            bump_minor_pre_major: true,
            tag_prefix: None,
            include_prerelease: false,
            prerelease: false,
        }
    }
}

impl VersioningConfig {
    pub fn candidate_options(&self) -> CandidateOptions {
        CandidateOptions {
            prerelease: self.prerelease,
            bump_minor_pre_major: self.bump_minor_pre_major,
        }
    }
}

/// Section mapping and template overrides.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "SectionConfig::defaults")]
    pub sections: Vec<SectionConfig>,

    #[serde(default = "default_breaking_title")]
    pub breaking_title: String,

    #[serde(default = "default_other_title")]
    pub other_title: String,

    #[serde(default)]
    pub hide_other: bool,

    #[serde(default = "default_true")]
    pub link_compare: bool,

    #[serde(default)]
    pub main_template: Option<String>,

    #[serde(default)]
    pub header_partial: Option<String>,

    #[serde(default)]
    pub commit_partial: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            sections: SectionConfig::defaults(),
            breaking_title: default_breaking_title(),
            other_title: default_other_title(),
            hide_other: false,
            link_compare: true,
            main_template: None,
            header_partial: None,
            commit_partial: None,
        }
    }
}

impl ChangelogConfig {
    pub fn layout(&self) -> SectionLayout {
        SectionLayout {
            sections: self.sections.clone(),
            breaking_title: self.breaking_title.clone(),
            other_title: self.other_title.clone(),
            hide_other: self.hide_other,
        }
    }

    pub fn templates(&self) -> Templates {
        Templates {
            main: self.main_template.clone(),
            header: self.header_partial.clone(),
            commit: self.commit_partial.clone(),
        }
    }
}

impl Config {
    /// Reject values that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.github.page_size == 0 || self.github.page_size > 100 {
            return Err(ChangelogError::config(format!(
                "github.page_size must be between 1 and 100, got {}",
                self.github.page_size
            )));
        }
        if self.github.request_timeout_secs == 0 {
            return Err(ChangelogError::config(
                "github.request_timeout_secs must be greater than 0",
            ));
        }
        if let Some(section) = self
            .changelog
            .sections
            .iter()
            .find(|s| s.commit_type.trim().is_empty())
        {
            return Err(ChangelogError::config(format!(
                "changelog section '{}' has an empty type",
                section.section
            )));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changelog.toml` in current directory
/// 3. `.changelog.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./changelog.toml").exists() {
        fs::read_to_string("./changelog.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".changelog.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| ChangelogError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
