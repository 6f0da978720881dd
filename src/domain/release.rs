use chrono::{DateTime, Utc};
use semver::Version;
use serde::Serialize;
use std::cmp::Ordering;

use super::version::ParsedTag;

/// A release derived from a version tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Normalized version, without the tag prefix
    pub version: Version,
    /// Name of the underlying tag
    pub tag: String,
    /// Commit the tag points to
    pub sha: String,
    pub prerelease: bool,
    /// Tagger time for annotated tags, commit time otherwise
    pub timestamp: DateTime<Utc>,
}

impl Release {
    pub fn new(
        tag: impl Into<String>,
        parsed: ParsedTag,
        sha: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Release {
            version: parsed.version,
            tag: tag.into(),
            sha: sha.into(),
            prerelease: parsed.prerelease,
            timestamp,
        }
    }
}

/// Semver precedence, ignoring build metadata
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Sort releases newest version first; equal precedence falls back to tag name.
pub fn sort_releases(releases: &mut [Release]) {
    releases.sort_by(|a, b| precedence(&b.version, &a.version).then_with(|| a.tag.cmp(&b.tag)));
}
