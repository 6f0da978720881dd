use std::cell::Cell;
use std::path::Path;

use git2::{
    BranchType, ErrorCode, FetchOptions, ObjectType, Oid, PushOptions, Repository as Git2Repo,
    Signature,
};

use crate::auth::AuthStrategy;
use crate::config::Tagger;
use crate::domain::branch::branch_name_from_ref;
use crate::domain::commit::git_time_to_utc;
use crate::domain::Commit;
use crate::error::{ProviderError, Result};
use crate::git::{CommitWalker, TagInfo};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the git repository at exactly this path
    ///
    /// No discovery in parent directories: the configured path must itself
    /// be a working copy (or bare repository).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::open(path).map_err(|e| {
            log::debug!("cannot open git repository at {}: {}", path.display(), e);
            ProviderError::RepositoryNotFound
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Underlying git2 handle
    pub fn inner(&self) -> &Git2Repo {
        &self.repo
    }

    fn tag_info(&self, name: &str) -> Result<TagInfo> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", name))?
            .resolve()?;
        let oid = reference
            .target()
            .ok_or_else(|| git2::Error::from_str(&format!("tag '{}' has no target", name)))?;
        let object = self.repo.find_object(oid, None)?;

        let (message, tagger_time) = match object.as_tag() {
            Some(tag) => (
                Some(String::from_utf8_lossy(tag.message_bytes().unwrap_or_default()).into_owned()),
                tag.tagger().map(|sig| sig.when()),
            ),
            None => (None, None),
        };

        // Only a tag on a tree or blob lacks a commit; any other failure is real
        let commit = match object.peel_to_commit() {
            Ok(commit) => Some(commit),
            Err(e) if matches!(e.code(), ErrorCode::Peel | ErrorCode::InvalidSpec) => None,
            Err(e) => return Err(ProviderError::GitRead(e)),
        };
        let time = tagger_time.or_else(|| commit.as_ref().map(|c| c.time()));

        Ok(TagInfo {
            name: name.to_string(),
            commit_sha: commit.as_ref().map(|c| c.id().to_string()),
            message,
            timestamp: time.map(git_time_to_utc).unwrap_or_default(),
        })
    }
}

impl super::GitRepository for Git2Repository {
    fn head_branch(&self) -> Result<String> {
        let head = self.repo.find_reference("HEAD")?;

        match head.symbolic_target() {
            Some(target) => branch_name_from_ref(target)
                .map(str::to_string)
                .ok_or_else(|| {
                    ProviderError::GitRead(git2::Error::from_str(&format!(
                        "HEAD points at '{}', which is not a branch",
                        target
                    )))
                }),
            None => Err(ProviderError::GitRead(git2::Error::from_str(
                "HEAD is detached",
            ))),
        }
    }

    fn list_tags(&self) -> Result<Vec<TagInfo>> {
        let names = self.repo.tag_names(None)?;

        names.iter().flatten().map(|name| self.tag_info(name)).collect()
    }

    fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        match self.tag_info(name) {
            Ok(info) => Ok(Some(info)),
            Err(ProviderError::GitRead(e)) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resolve_commit(&self, rev: &str) -> Result<String> {
        self.repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id().to_string())
            .map_err(|e| {
                log::debug!("cannot resolve '{}' to a commit: {}", rev, e);
                ProviderError::CommitNotFound(rev.to_string())
            })
    }

    fn commits(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>> {
        let branch_ref = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|e| match e.code() {
                ErrorCode::NotFound => ProviderError::BranchNotFound(branch.to_string()),
                _ => ProviderError::GitRead(e),
            })?;
        let tip = branch_ref.get().peel_to_commit()?.id();

        let since = since
            .map(|sha| Oid::from_str(sha).map_err(|_| ProviderError::CommitNotFound(sha.to_string())))
            .transpose()?;

        CommitWalker::new(&self.repo).walk(tip, since)
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target_sha: &str,
        tagger: &Tagger,
        message: &str,
        force: bool,
    ) -> Result<()> {
        let target = Oid::from_str(target_sha)
            .and_then(|oid| self.repo.find_object(oid, Some(ObjectType::Commit)))
            .map_err(|_| ProviderError::CommitNotFound(target_sha.to_string()))?;

        let signature =
            Signature::now(&tagger.name, &tagger.email).map_err(ProviderError::GitWrite)?;

        match self.repo.tag(name, &target, &signature, message, force) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == ErrorCode::Exists => {
                Err(ProviderError::DuplicateRelease(name.to_string()))
            }
            Err(e) => Err(ProviderError::GitWrite(e)),
        }
    }

    fn push(&self, remote: &str, refspecs: &[String], auth: &AuthStrategy) -> Result<()> {
        let push_error = |source: git2::Error| ProviderError::Push {
            remote: remote.to_string(),
            refspecs: refspecs.to_vec(),
            source,
        };

        let mut git_remote = self.repo.find_remote(remote).map_err(push_error)?;

        let rejected = Cell::new(false);
        let mut callbacks = auth.remote_callbacks(&rejected);

        // Catch refs the remote refused even though the transport succeeded
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        match git_remote.push(refspecs, Some(&mut push_options)) {
            Ok(()) => Ok(()),
            Err(e) if rejected.get() || e.code() == ErrorCode::Auth => {
                Err(ProviderError::auth(remote, e.message()))
            }
            Err(e) => Err(push_error(e)),
        }
    }

    fn fetch(&self, remote: &str, refspecs: &[String], auth: &AuthStrategy) -> Result<()> {
        let fetch_error = |source: git2::Error| ProviderError::Fetch {
            remote: remote.to_string(),
            source,
        };

        let mut git_remote = self.repo.find_remote(remote).map_err(fetch_error)?;

        let rejected = Cell::new(false);
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(auth.remote_callbacks(&rejected));

        match git_remote.fetch(refspecs, Some(&mut fetch_options), None) {
            Ok(()) => Ok(()),
            Err(e) if rejected.get() || e.code() == ErrorCode::Auth => {
                Err(ProviderError::auth(remote, e.message()))
            }
            Err(e) => Err(fetch_error(e)),
        }
    }
}
