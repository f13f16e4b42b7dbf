//! Domain logic - pure rules independent of the remote host

pub mod commit;
pub mod prerelease;
pub mod repository;
pub mod tag;
pub mod version;

pub use commit::{filter_reverted, ClassifiedCommit, Commit, Reference, Revert};
pub use prerelease::PreRelease;
pub use repository::RepositoryRef;
pub use tag::Tag;
pub use version::BumpLevel;
