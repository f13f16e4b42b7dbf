//! Changelog rendering
//!
//! `commits -> classify -> group -> render`: grouping lives in [sections],
//! the handlebars layout in [renderer].

pub mod renderer;
pub mod sections;

pub use renderer::{ChangelogContext, ChangelogRenderer, Templates};
pub use sections::{group_commits, Section, SectionConfig, SectionLayout};
