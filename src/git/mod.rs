//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git engine the
//! release provider drives, allowing for a real `git2` implementation and a
//! mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [GitRepository] trait, which defines the
//! git operations the provider needs. The concrete implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! Commit history traversal for the `git2` backend lives in [walker].
//!
//! # Usage
//!
//! Provider code depends on the [GitRepository] trait rather than concrete
//! implementations:
//!
//! ```rust
//! # use provider_git::git::GitRepository;
//! # fn example<R: GitRepository>(repo: &R) -> provider_git::Result<()> {
//! let branch = repo.head_branch()?;
//! let commits = repo.commits(&branch, None)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod walker;

pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use walker::CommitWalker;

use chrono::{DateTime, Utc};

use crate::auth::AuthStrategy;
use crate::config::Tagger;
use crate::domain::Commit;
use crate::error::Result;

/// A tag as stored by the engine, before any version interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Short tag name (without `refs/tags/`)
    pub name: String,
    /// Commit the tag resolves to; `None` when it targets a tree or blob
    pub commit_sha: Option<String>,
    /// Message of an annotated tag; `None` for lightweight tags
    pub message: Option<String>,
    /// Tagger time for annotated tags, commit time otherwise
    pub timestamp: DateTime<Utc>,
}

/// Git engine operations needed by the release provider
///
/// ## Thread Safety
///
/// Implementors must be `Send` so a provider can be moved to another thread.
/// They are not required to be `Sync`: a repository handle is used from one
/// thread at a time.
///
/// ## Error Handling
///
/// Implementations map engine errors to the matching
/// [crate::error::ProviderError] variant (`GitRead` for read failures,
/// `BranchNotFound`/`CommitNotFound` for bad references, `Push`/`Fetch`/
/// `Authentication` for network operations).
pub trait GitRepository: Send {
    /// Name of the branch HEAD points at
    ///
    /// Works for an unborn HEAD (a fresh repository without commits).
    ///
    /// # Returns
    /// * `Ok(String)` - Branch name (e.g., "master")
    /// * `Err` - If HEAD is detached or cannot be read
    fn head_branch(&self) -> Result<String>;

    /// List every tag in the repository
    ///
    /// # Returns
    /// * `Ok(Vec<TagInfo>)` - All tags with their resolved targets
    /// * `Err` - If tag enumeration fails
    fn list_tags(&self) -> Result<Vec<TagInfo>>;

    /// Look up a single tag by short name
    ///
    /// # Returns
    /// * `Ok(Some(TagInfo))` - The tag exists
    /// * `Ok(None)` - No tag with that name
    fn find_tag(&self, name: &str) -> Result<Option<TagInfo>>;

    /// Resolve a revision (full or abbreviated SHA) to a full commit SHA
    ///
    /// # Returns
    /// * `Ok(String)` - The full 40-character SHA
    /// * `Err(CommitNotFound)` - If the revision does not name a commit
    fn resolve_commit(&self, rev: &str) -> Result<String>;

    /// Commits reachable from the tip of a local branch, most recent first
    ///
    /// # Arguments
    /// * `branch` - Local branch name
    /// * `since` - Full SHA to stop at (excluded); `None` walks the whole history
    ///
    /// # Returns
    /// * `Ok(Vec<Commit>)` - Commits in a stable, most-recent-first order
    /// * `Err(BranchNotFound)` - If the branch does not exist
    fn commits(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>>;

    /// Create an annotated tag pointing at a commit
    ///
    /// Compare-and-create: fails with `DuplicateRelease` if the tag exists
    /// and `force` is false, replaces it otherwise.
    ///
    /// # Arguments
    /// * `name` - Tag name
    /// * `target_sha` - Full SHA of the commit to tag
    /// * `tagger` - Identity recorded in the tag
    /// * `message` - Tag message, written as given
    /// * `force` - Replace an existing tag of the same name
    fn create_annotated_tag(
        &self,
        name: &str,
        target_sha: &str,
        tagger: &Tagger,
        message: &str,
        force: bool,
    ) -> Result<()>;

    /// Push refspecs to a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `refspecs` - Refspecs to push, `+`-prefixed for forced updates
    /// * `auth` - Credentials to present
    fn push(&self, remote: &str, refspecs: &[String], auth: &AuthStrategy) -> Result<()>;

    /// Fetch refspecs from a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `refspecs` - Refspecs to fetch
    /// * `auth` - Credentials to present
    fn fetch(&self, remote: &str, refspecs: &[String], auth: &AuthStrategy) -> Result<()>;
}
