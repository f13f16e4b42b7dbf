//! Release analysis: which tag came last, how far to bump, what comes next

pub mod bump;
pub mod candidate;
pub mod tag_resolver;

pub use bump::{BumpRecommender, Recommendation};
pub use candidate::{CandidateOptions, ReleaseCandidate, ResolutionPath};
pub use tag_resolver::TagResolver;
