use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Identity recorded on a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A commit on a branch, as handed to changelog generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub sha: String,
    /// Full message exactly as authored
    pub raw_message: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    /// First line of the message
    pub fn summary(&self) -> &str {
        self.raw_message.lines().next().unwrap_or("")
    }
}

/// Convert a git timestamp (seconds since epoch) to UTC
pub fn git_time_to_utc(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_default()
}
