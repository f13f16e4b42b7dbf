//! Terminal output for the binary.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_candidate_summary, display_error, display_status,
    format_candidate_summary,
};
