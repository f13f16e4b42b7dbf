pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestration;
pub mod remote;
pub mod ui;

pub use error::{ChangelogError, Result};
pub use orchestration::{
    generate_changelog, generate_github_changelog, ChangelogResponse, GenerateChangelogRequest,
};
