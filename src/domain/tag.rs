use crate::error::Result;
use regex::Regex;
use semver::Version;

/// Tag naming convention for new releases (e.g., prefix "v" -> "v1.2.3")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub prefix: String,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPattern {
            prefix: prefix.into(),
        }
    }

    /// Format a version according to pattern
    /// Example: prefix="v", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        format!("{}{}", self.prefix, version)
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new("v")
    }
}

/// Name filter applied to tags before they become releases.
///
/// An empty expression matches every tag.
#[derive(Debug, Clone)]
pub struct TagFilter {
    regex: Option<Regex>,
}

impl TagFilter {
    /// Compile a filter from a regular expression over tag names
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(TagFilter { regex: None });
        }
        Ok(TagFilter {
            regex: Some(Regex::new(pattern)?),
        })
    }

    /// Validate if a tag name passes this filter
    pub fn matches(&self, tag: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::default();
        assert_eq!(pattern.format(&Version::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn test_pattern_format_with_custom_prefix() {
        let pattern = TagPattern::new("release-");
        assert_eq!(
            pattern.format(&Version::parse("2.0.0-rc.1").unwrap()),
            "release-2.0.0-rc.1"
        );
    }

    #[test]
    fn test_pattern_format_without_prefix() {
        let pattern = TagPattern::new("");
        assert_eq!(pattern.format(&Version::new(0, 1, 0)), "0.1.0");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TagFilter::new("").unwrap();
        assert!(filter.matches("v1.0.0"));
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_filter_matches() {
        let filter = TagFilter::new("^v2").unwrap();
        assert!(filter.matches("v2.0.0-beta.1"));
        assert!(!filter.matches("v1.9.0"));
    }

    #[test]
    fn test_filter_is_unanchored_by_default() {
        let filter = TagFilter::new("beta").unwrap();
        assert!(filter.matches("v2.0.0-beta.3"));
    }

    #[test]
    fn test_invalid_filter() {
        let err = TagFilter::new("v[").unwrap_err();
        assert!(matches!(err, ProviderError::Pattern(_)));
    }
}
