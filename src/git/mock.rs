use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};

use crate::auth::AuthStrategy;
use crate::config::Tagger;
use crate::domain::{Author, Commit};
use crate::error::{ProviderError, Result};
use crate::git::{GitRepository, TagInfo};

/// Mock repository for testing without actual git operations
///
/// Branches are linear lists of commits. Tag writes and pushes are recorded
/// so tests can assert on them.
pub struct MockRepository {
    head: Option<String>,
    branches: HashMap<String, Vec<Commit>>,
    tags: RefCell<BTreeMap<String, TagInfo>>,
    pushes: RefCell<Vec<(String, Vec<String>)>>,
    push_failure: Option<String>,
    reject_credentials: bool,
}

impl MockRepository {
    /// Create a new empty mock repository with HEAD on `head_branch`
    pub fn new(head_branch: impl Into<String>) -> Self {
        MockRepository {
            head: Some(head_branch.into()),
            branches: HashMap::new(),
            tags: RefCell::new(BTreeMap::new()),
            pushes: RefCell::new(Vec::new()),
            push_failure: None,
            reject_credentials: false,
        }
    }

    /// Detach HEAD
    pub fn detach_head(&mut self) {
        self.head = None;
    }

    /// Append a commit to a branch and return its SHA
    pub fn add_commit(&mut self, branch: &str, message: &str) -> String {
        let total: usize = self.branches.values().map(Vec::len).sum();
        let sha = format!("{:040x}", total + 1);
        let commit = Commit {
            sha: sha.clone(),
            raw_message: message.to_string(),
            author: Author {
                name: "test".to_string(),
                email: "test@test.com".to_string(),
            },
            timestamp: mock_time(total as i64),
        };
        self.branches
            .entry(branch.to_string())
            .or_default()
            .push(commit);
        sha
    }

    /// Add a lightweight tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, commit_sha: &str) {
        let name = name.into();
        let timestamp = self
            .find_commit(commit_sha)
            .map(|c| c.timestamp)
            .unwrap_or_default();
        self.tags.get_mut().insert(
            name.clone(),
            TagInfo {
                name,
                commit_sha: Some(commit_sha.to_string()),
                message: None,
                timestamp,
            },
        );
    }

    /// Add a tag that does not point at a commit (e.g., a tagged tree)
    pub fn add_non_commit_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.tags.get_mut().insert(
            name.clone(),
            TagInfo {
                name,
                commit_sha: None,
                message: None,
                timestamp: DateTime::<Utc>::default(),
            },
        );
    }

    /// Make every push fail with a transport error
    pub fn fail_pushes(&mut self, message: impl Into<String>) {
        self.push_failure = Some(message.into());
    }

    /// Make every network operation fail as if credentials were rejected
    pub fn reject_credentials(&mut self) {
        self.reject_credentials = true;
    }

    /// Pushes performed so far, as (remote, refspecs)
    pub fn pushes(&self) -> Vec<(String, Vec<String>)> {
        self.pushes.borrow().clone()
    }

    fn find_commit(&self, sha: &str) -> Option<&Commit> {
        self.branches
            .values()
            .flatten()
            .find(|c| c.sha == sha || (sha.len() >= 4 && c.sha.starts_with(sha)))
    }
}

fn mock_time(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_600_000_000 + offset, 0)
        .single()
        .unwrap_or_default()
}

impl GitRepository for MockRepository {
    fn head_branch(&self) -> Result<String> {
        self.head
            .clone()
            .ok_or_else(|| ProviderError::GitRead(git2::Error::from_str("HEAD is detached")))
    }

    fn list_tags(&self) -> Result<Vec<TagInfo>> {
        Ok(self.tags.borrow().values().cloned().collect())
    }

    fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        Ok(self.tags.borrow().get(name).cloned())
    }

    fn resolve_commit(&self, rev: &str) -> Result<String> {
        self.find_commit(rev)
            .map(|c| c.sha.clone())
            .ok_or_else(|| ProviderError::CommitNotFound(rev.to_string()))
    }

    fn commits(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>> {
        let commits = self
            .branches
            .get(branch)
            .ok_or_else(|| ProviderError::BranchNotFound(branch.to_string()))?;

        Ok(commits
            .iter()
            .rev()
            .take_while(|c| Some(c.sha.as_str()) != since)
            .cloned()
            .collect())
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target_sha: &str,
        _tagger: &Tagger,
        message: &str,
        force: bool,
    ) -> Result<()> {
        let mut tags = self.tags.borrow_mut();
        if tags.contains_key(name) && !force {
            return Err(ProviderError::DuplicateRelease(name.to_string()));
        }
        tags.insert(
            name.to_string(),
            TagInfo {
                name: name.to_string(),
                commit_sha: Some(target_sha.to_string()),
                message: Some(message.to_string()),
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    fn push(&self, remote: &str, refspecs: &[String], _auth: &AuthStrategy) -> Result<()> {
        if self.reject_credentials {
            return Err(ProviderError::auth(remote, "credentials rejected by remote"));
        }
        if let Some(message) = &self.push_failure {
            return Err(ProviderError::Push {
                remote: remote.to_string(),
                refspecs: refspecs.to_vec(),
                source: git2::Error::from_str(message),
            });
        }
        self.pushes
            .borrow_mut()
            .push((remote.to_string(), refspecs.to_vec()));
        Ok(())
    }

    fn fetch(&self, remote: &str, _refspecs: &[String], _auth: &AuthStrategy) -> Result<()> {
        if self.reject_credentials {
            return Err(ProviderError::auth(remote, "credentials rejected by remote"));
        }
        Ok(())
    }
}
