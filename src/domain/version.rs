use crate::error::{ProviderError, Result};
use semver::Version;

/// A tag name successfully read as a semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub version: Version,
    pub prerelease: bool,
}

fn strip_prefix(name: &str) -> &str {
    name.strip_prefix('v')
        .or_else(|| name.strip_prefix('V'))
        .unwrap_or(name)
}

/// Parse a tag name as a semantic version (e.g., "v1.2.3" -> 1.2.3)
///
/// Tolerates a single leading `v` or `V`. Tags that are not versions yield
/// `None`; they are simply not releases.
pub fn parse_tag(name: &str) -> Option<ParsedTag> {
    let version = Version::parse(strip_prefix(name.trim())).ok()?;
    let prerelease = !version.pre.is_empty();
    Some(ParsedTag {
        version,
        prerelease,
    })
}

/// Parse a tag name written with a configured release prefix.
///
/// A name carrying `prefix` is parsed from what follows it. Any other name
/// gets the plain [`parse_tag`] treatment, so `v1.2.3` and `1.2.3` stay
/// releases whatever the prefix is.
pub fn parse_tag_with_prefix(name: &str, prefix: &str) -> Option<ParsedTag> {
    let name = name.trim();
    if !prefix.is_empty() {
        if let Some(parsed) = name.strip_prefix(prefix).and_then(parse_tag) {
            return Some(parsed);
        }
    }
    parse_tag(name)
}

/// Parse the version requested for a new release.
///
/// Same leniency as [`parse_tag`], but a failure is an error because the
/// caller asked for this exact version.
pub fn parse_release_version(input: &str) -> Result<Version> {
    Version::parse(strip_prefix(input.trim())).map_err(|e| {
        ProviderError::version(format!("'{}' is not a semantic version: {}", input, e))
    })
}
