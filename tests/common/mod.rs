//! Common test utilities: repositories built with git2 in temp directories
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

/// Commit times start here and grow by one second per commit
pub const BASE_TIME: i64 = 1_700_000_000;

/// Initialize a repository whose HEAD starts on `master`
pub fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    Repository::init_opts(path, &opts).expect("Could not init git repo")
}

/// Create an empty-tree commit on top of `refname` and move the ref to it
pub fn commit(repo: &Repository, refname: &str, message: &str, seconds: i64) -> Oid {
    let sig = Signature::new("test", "test@test.com", &Time::new(seconds, 0))
        .expect("Could not create signature");
    let tree_id = repo
        .treebuilder(None)
        .and_then(|builder| builder.write())
        .expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");

    let parent = repo
        .find_reference(refname)
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some(refname), &sig, &sig, message, &tree, &parents)
        .expect("Could not create commit")
}

/// Lightweight tag, like `git tag <name> <oid>`
pub fn tag(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("Could not find object");
    repo.tag_lightweight(name, &object, false)
        .expect("Could not create tag");
}

/// The release history scenario:
///
/// - 100 commits on `master` ("feat: commit 0" .. "feat: commit 99")
/// - `v1.0.0` .. `v1.9.0` on every 10th commit
/// - `v2.0.0-beta.1` .. `v2.0.0-beta.20` on every 5th commit
/// - a `new-fix` branch with one extra "fix: error" commit
/// - HEAD left on `master`
pub fn setup_release_repo() -> TempDir {
    let dir = TempDir::new().expect("Could not create temp dir");
    let repo = init_repo(dir.path());

    let mut version_count = 0;
    let mut beta_count = 1;
    for i in 0..100 {
        let oid = commit(
            &repo,
            "refs/heads/master",
            &format!("feat: commit {}", i),
            BASE_TIME + i as i64,
        );
        if i % 10 == 0 {
            tag(&repo, &format!("v1.{}.0", version_count), oid);
            version_count += 1;
        }
        if i % 5 == 0 {
            tag(&repo, &format!("v2.0.0-beta.{}", beta_count), oid);
            beta_count += 1;
        }
    }

    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .expect("Could not read HEAD");
    repo.branch("new-fix", &head, false)
        .expect("Could not create branch");
    commit(&repo, "refs/heads/new-fix", "fix: error", BASE_TIME + 100);

    dir
}

/// Create a bare repository and register it as a remote of `repo_path`
pub fn add_bare_remote(repo_path: &Path, name: &str) -> TempDir {
    let remote_dir = TempDir::new().expect("Could not create temp dir");
    Repository::init_bare(remote_dir.path()).expect("Could not init bare repo");

    let repo = Repository::open(repo_path).expect("Could not open repo");
    let url = remote_dir.path().to_str().expect("Non UTF-8 temp path");
    repo.remote(name, url).expect("Could not add remote");

    remote_dir
}

/// SHA the master branch points at
pub fn master_head(path: &Path) -> String {
    let repo = Repository::open(path).expect("Could not open repo");
    let head = repo
        .find_reference("refs/heads/master")
        .and_then(|r| r.peel_to_commit())
        .expect("Could not read master");
    head.id().to_string()
}

/// Provider configuration for a repository path plus extra keys
pub fn config_for(path: &Path, extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut config = HashMap::new();
    config.insert(
        "git_path".to_string(),
        path.to_str().expect("Non UTF-8 temp path").to_string(),
    );
    for (key, value) in extra {
        config.insert(key.to_string(), value.to_string());
    }
    config
}

/// Tagger identity used by release-creating tests
pub const TAGGER: [(&str, &str); 2] = [("tagger_name", "test"), ("tagger_email", "test@test.com")];
