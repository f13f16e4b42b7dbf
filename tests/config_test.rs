// tests/config_test.rs
use git_changelog::config::{load_config, Config};
use git_changelog::ChangelogError;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.github.api_url, "https://api.github.com");
    assert_eq!(config.github.token_env, "GITHUB_TOKEN");
    assert_eq!(config.github.request_timeout(), Duration::from_secs(30));
    assert!(config.versioning.tag_prefix.is_none());
    assert!(config.changelog.link_compare);
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[versioning]
bump_minor_pre_major = false

[[changelog.sections]]
type = "feat"
section = "Added"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert!(!config.versioning.bump_minor_pre_major);
    assert_eq!(config.changelog.sections.len(), 1);
    assert_eq!(config.changelog.sections[0].section, "Added");
    assert!(!config.changelog.sections[0].hidden);
    // untouched tables keep their defaults
    assert_eq!(config.github.page_size, 100);
}

#[test]
fn test_load_full_fixture() {
    let config = load_config(Some("tests/fixtures/full_config.toml"))
        .expect("Failed to load test config");

    assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.proxy_key.as_deref(), Some("abc123"));
    assert_eq!(config.github.page_size, 50);
    assert_eq!(config.github.retry_delay(), Duration::from_millis(250));

    let options = config.versioning.candidate_options();
    assert!(options.prerelease);
    assert!(!options.bump_minor_pre_major);
    assert_eq!(config.versioning.tag_prefix.as_deref(), Some("core-"));

    let layout = config.changelog.layout();
    assert_eq!(layout.breaking_title, "Breaking");
    assert!(layout.hide_other);
    assert!(layout.sections[2].hidden);
    assert_eq!(
        config.changelog.templates().commit.as_deref(),
        Some("\n- {{text}}")
    );
}

#[test]
fn test_invalid_toml_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[github\npage_size = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ChangelogError::Config(_)));
}

#[test]
fn test_invalid_values_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[github]\npage_size = 500\n")
        .unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_missing_explicit_file_is_io_error() {
    let err = load_config(Some("tests/fixtures/does_not_exist.toml")).unwrap_err();
    assert!(matches!(err, ChangelogError::Io(_)));
}

#[test]
#[serial]
fn test_token_from_configured_env() {
    let mut config = Config::default();
    config.github.token_env = "GIT_CHANGELOG_TEST_TOKEN".to_string();

    std::env::set_var("GIT_CHANGELOG_TEST_TOKEN", "s3cret");
    assert_eq!(config.github.token().as_deref(), Some("s3cret"));

    std::env::set_var("GIT_CHANGELOG_TEST_TOKEN", "  ");
    assert_eq!(config.github.token(), None);

    std::env::remove_var("GIT_CHANGELOG_TEST_TOKEN");
    assert_eq!(config.github.token(), None);
}
