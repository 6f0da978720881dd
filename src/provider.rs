//! The release repository: git tags and history as the record of releases.
//!
//! A [`ReleaseRepository`] is created once from the host's configuration map
//! and then answers the lifecycle calls: [`get_info`], [`get_releases`],
//! [`get_commits`] and [`create_release`].
//!
//! Creating a release is two steps, local then remote. They are exposed
//! separately as [`create_tag`] and [`push_tag`] so a caller that got a
//! [`ProviderError::Push`] can retry only the push.
//!
//! [`get_info`]: ReleaseRepository::get_info
//! [`get_releases`]: ReleaseRepository::get_releases
//! [`get_commits`]: ReleaseRepository::get_commits
//! [`create_release`]: ReleaseRepository::create_release
//! [`create_tag`]: ReleaseRepository::create_tag
//! [`push_tag`]: ReleaseRepository::push_tag

use std::collections::HashMap;

use crate::config::ProviderConfig;
use crate::domain::{
    parse_release_version, parse_tag_with_prefix, sort_releases, Commit, Release, RepositoryInfo,
    TagFilter,
};
use crate::error::{ProviderError, Result};
use crate::git::{Git2Repository, GitRepository};

/// Input for creating a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Version to release, e.g. "2.0.0"
    pub new_version: String,
    /// Commit the release tag points at
    pub sha: String,
    /// Tag message
    pub changelog: String,
    /// Replace an existing tag locally and on the remote
    pub force: bool,
}

impl ReleaseRequest {
    pub fn new(
        new_version: impl Into<String>,
        sha: impl Into<String>,
        changelog: impl Into<String>,
    ) -> Self {
        ReleaseRequest {
            new_version: new_version.into(),
            sha: sha.into(),
            changelog: changelog.into(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Trailing newlines collapse to exactly one
fn normalize_message(changelog: &str) -> String {
    format!("{}\n", changelog.trim_end_matches(|c| c == '\n' || c == '\r'))
}

/// Release provider over a git repository
pub struct ReleaseRepository<R: GitRepository = Git2Repository> {
    repo: R,
    config: ProviderConfig,
}

impl ReleaseRepository<Git2Repository> {
    /// Initialize from the host's configuration map.
    ///
    /// Opens the repository at `git_path` eagerly, so a missing or broken
    /// repository fails here with [`ProviderError::RepositoryNotFound`].
    pub fn init(config: &HashMap<String, String>) -> Result<Self> {
        let config = ProviderConfig::from_map(config)?;
        let repo = Git2Repository::open(&config.git_path)?;

        log::debug!(
            "opened {} (auth: {}, remote: {})",
            config.git_path.display(),
            config.auth.mode(),
            config.remote_name
        );

        Ok(ReleaseRepository::with_backend(repo, config))
    }
}

impl<R: GitRepository> ReleaseRepository<R> {
    /// Create a provider over an already opened backend
    pub fn with_backend(repo: R, config: ProviderConfig) -> Self {
        ReleaseRepository { repo, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn backend(&self) -> &R {
        &self.repo
    }

    /// Default branch: the configured one verbatim, else the HEAD branch.
    pub fn get_info(&self) -> Result<RepositoryInfo> {
        let default_branch = match &self.config.default_branch {
            Some(branch) => branch.clone(),
            None => self.repo.head_branch()?,
        };

        Ok(RepositoryInfo { default_branch })
    }

    /// Releases, newest version first.
    ///
    /// Every tag whose name parses as a semantic version is a release. The
    /// configured tag prefix is stripped first, so tags written by
    /// [`create_release`](ReleaseRepository::create_release) are always listed.
    /// A non-empty `name_pattern` is a regex the tag name must match.
    pub fn get_releases(&self, name_pattern: &str) -> Result<Vec<Release>> {
        let filter = TagFilter::new(name_pattern)?;
        let tags = self.repo.list_tags()?;
        let total = tags.len();

        let mut releases = Vec::new();
        for tag in tags {
            if !filter.matches(&tag.name) {
                continue;
            }
            let prefix = &self.config.tag_pattern.prefix;
            let Some(parsed) = parse_tag_with_prefix(&tag.name, prefix) else {
                log::debug!("tag '{}' is not a version, skipped", tag.name);
                continue;
            };
            let Some(sha) = tag.commit_sha else {
                log::warn!("tag '{}' does not point at a commit, skipped", tag.name);
                continue;
            };
            releases.push(Release::new(tag.name, parsed, sha, tag.timestamp));
        }

        sort_releases(&mut releases);
        log::debug!("{} of {} tags are releases", releases.len(), total);
        Ok(releases)
    }

    /// Commits on `branch`, most recent first, stopping before `since_sha`.
    ///
    /// An empty `since_sha` returns the branch's whole history.
    pub fn get_commits(&self, since_sha: &str, branch: &str) -> Result<Vec<Commit>> {
        let since = match since_sha.trim() {
            "" => None,
            sha => Some(self.repo.resolve_commit(sha)?),
        };

        self.repo.commits(branch, since.as_deref())
    }

    /// Tag name used for a version (e.g., "2.0.0" -> "v2.0.0")
    pub fn tag_name(&self, version: &str) -> Result<String> {
        let version = parse_release_version(version)?;
        Ok(self.config.tag_pattern.format(&version))
    }

    /// Create the annotated release tag locally, without pushing.
    ///
    /// # Returns
    /// * `Ok(String)` - Name of the created tag
    /// * `Err(Configuration)` - Tagger name or email not configured
    /// * `Err(Version)` - `new_version` is not a semantic version
    /// * `Err(CommitNotFound)` - `sha` does not name a commit
    /// * `Err(DuplicateRelease)` - Tag exists and `force` is not set
    pub fn create_tag(&mut self, request: &ReleaseRequest) -> Result<String> {
        if !self.config.tagger.is_complete() {
            return Err(ProviderError::config(
                "tagger_name and tagger_email are required to create a release",
            ));
        }

        let tag_name = self.tag_name(&request.new_version)?;
        let sha = self.repo.resolve_commit(&request.sha)?;

        self.repo.create_annotated_tag(
            &tag_name,
            &sha,
            &self.config.tagger,
            &normalize_message(&request.changelog),
            request.force,
        )?;

        log::info!("created tag {} at {}", tag_name, sha);
        Ok(tag_name)
    }

    /// Push an existing local tag to the configured remote.
    ///
    /// With `push_branch` set, the default branch is pushed in the same
    /// operation. The branch update is never forced.
    pub fn push_tag(&self, tag_name: &str, force: bool) -> Result<()> {
        let refspecs = self.push_refspecs(tag_name, force)?;

        self.repo
            .push(&self.config.remote_name, &refspecs, &self.config.auth)?;

        log::info!("pushed {} to {}", tag_name, self.config.remote_name);
        Ok(())
    }

    /// Refspecs [`push_tag`] sends for a release tag.
    ///
    /// [`push_tag`]: ReleaseRepository::push_tag
    pub fn push_refspecs(&self, tag_name: &str, force: bool) -> Result<Vec<String>> {
        let mut refspecs = vec![format!(
            "{}refs/tags/{}:refs/tags/{}",
            if force { "+" } else { "" },
            tag_name,
            tag_name
        )];

        if self.config.push_branch {
            let branch = self.get_info()?.default_branch;
            refspecs.push(format!("refs/heads/{}:refs/heads/{}", branch, branch));
        }

        Ok(refspecs)
    }

    /// Create the release tag and push it.
    ///
    /// Not atomic: when the push fails the local tag stays and the
    /// [`ProviderError::Push`] is returned; retry with [`push_tag`].
    ///
    /// [`push_tag`]: ReleaseRepository::push_tag
    pub fn create_release(&mut self, request: &ReleaseRequest) -> Result<String> {
        let tag_name = self.create_tag(request)?;
        self.push_tag(&tag_name, request.force)?;
        Ok(tag_name)
    }

    /// Refresh local tags from the configured remote
    pub fn fetch_tags(&mut self) -> Result<()> {
        let refspecs = vec!["+refs/tags/*:refs/tags/*".to_string()];
        self.repo
            .fetch(&self.config.remote_name, &refspecs, &self.config.auth)?;
        log::info!("fetched tags from {}", self.config.remote_name);
        Ok(())
    }
}
