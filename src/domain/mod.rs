//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod commit;
pub mod release;
pub mod tag;
pub mod version;

pub use branch::RepositoryInfo;
pub use commit::{Author, Commit};
pub use release::{sort_releases, Release};
pub use tag::{TagFilter, TagPattern};
pub use version::{parse_release_version, parse_tag, parse_tag_with_prefix, ParsedTag};
