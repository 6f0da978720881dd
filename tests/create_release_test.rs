// tests/create_release_test.rs
mod common;

use git2::Repository;
use provider_git::git::GitRepository;
use provider_git::{ProviderError, ReleaseRepository, ReleaseRequest};

use common::{add_bare_remote, config_for, master_head, setup_release_repo, TAGGER};

fn tag_message(path: &std::path::Path, tag: &str) -> (String, String) {
    let repo = Repository::open(path).unwrap();
    let reference = repo
        .find_reference(&format!("refs/tags/{}", tag))
        .unwrap();
    let annotated = reference.peel_to_tag().unwrap();
    let target = annotated.target_id().to_string();
    (annotated.message().unwrap_or_default().to_string(), target)
}

#[test]
fn test_create_release() {
    let dir = setup_release_repo();
    let remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    let tag = repo
        .create_release(&ReleaseRequest::new("2.0.0", head.clone(), "new feature"))
        .unwrap();
    assert_eq!(tag, "v2.0.0");

    let (message, target) = tag_message(dir.path(), "v2.0.0");
    assert_eq!(message, "new feature\n");
    assert_eq!(target, head);

    let (remote_message, remote_target) = tag_message(remote.path(), "v2.0.0");
    assert_eq!(remote_message, "new feature\n");
    assert_eq!(remote_target, head);

    let releases = repo.get_releases("").unwrap();
    assert_eq!(releases.len(), 31);
    assert_eq!(releases[0].tag, "v2.0.0");
    assert_eq!(releases[0].sha, head);
}

#[test]
fn test_create_release_tagger_on_tag() {
    let dir = setup_release_repo();
    let _remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", head, "new feature"))
        .unwrap();

    let git = Repository::open(dir.path()).unwrap();
    let annotated = git
        .find_reference("refs/tags/v2.0.0")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    let tagger = annotated.tagger().unwrap();
    assert_eq!(tagger.name(), Some("test"));
    assert_eq!(tagger.email(), Some("test@test.com"));
}

#[test]
fn test_create_release_duplicate() {
    let dir = setup_release_repo();
    let _remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", head.clone(), "first"))
        .unwrap();

    let err = repo
        .create_release(&ReleaseRequest::new("2.0.0", head, "second"))
        .unwrap_err();
    assert!(matches!(err, ProviderError::DuplicateRelease(ref t) if t == "v2.0.0"));

    let (message, _) = tag_message(dir.path(), "v2.0.0");
    assert_eq!(message, "first\n");
}

#[test]
fn test_create_release_force_replaces_tag() {
    let dir = setup_release_repo();
    let remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());
    let previous = {
        let git = Repository::open(dir.path()).unwrap();
        let id = git.revparse_single("master~1").unwrap().id();
        id.to_string()
    };

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", previous, "first"))
        .unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", head.clone(), "second").with_force(true))
        .unwrap();

    let (message, target) = tag_message(dir.path(), "v2.0.0");
    assert_eq!(message, "second\n");
    assert_eq!(target, head);

    let (remote_message, remote_target) = tag_message(remote.path(), "v2.0.0");
    assert_eq!(remote_message, "second\n");
    assert_eq!(remote_target, head);
}

#[test]
fn test_create_release_push_failure_keeps_local_tag() {
    let dir = setup_release_repo();
    {
        let git = Repository::open(dir.path()).unwrap();
        let missing = dir.path().join("no-such-remote");
        git.remote("origin", missing.to_str().unwrap()).unwrap();
    }
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    let err = repo
        .create_release(&ReleaseRequest::new("2.0.0", head.clone(), "new feature"))
        .unwrap_err();
    assert!(err.is_recoverable(), "unexpected error: {}", err);
    assert!(matches!(err, ProviderError::Push { ref refspecs, .. } if refspecs.len() == 1));

    let local = repo.backend().find_tag("v2.0.0").unwrap().unwrap();
    assert_eq!(local.commit_sha, Some(head));
}

#[test]
fn test_create_release_unknown_remote() {
    let dir = setup_release_repo();
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    let err = repo
        .create_release(&ReleaseRequest::new("2.0.0", head.clone(), "new feature"))
        .unwrap_err();
    assert!(
        matches!(err, ProviderError::Push { ref remote, .. } if remote == "origin"),
        "unexpected error: {}",
        err
    );
    assert!(err.is_recoverable());

    let local = repo.backend().find_tag("v2.0.0").unwrap().unwrap();
    assert_eq!(local.commit_sha, Some(head));
}

#[test]
fn test_create_release_requires_tagger() {
    let dir = setup_release_repo();
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &[])).unwrap();
    let err = repo
        .create_release(&ReleaseRequest::new("2.0.0", head, "new feature"))
        .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));
    assert_eq!(repo.backend().find_tag("v2.0.0").unwrap(), None);
}

#[test]
fn test_create_release_invalid_version() {
    let dir = setup_release_repo();
    let head = master_head(dir.path());

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    let err = repo
        .create_tag(&ReleaseRequest::new("two", head, "new feature"))
        .unwrap_err();
    assert!(matches!(err, ProviderError::Version(_)));
}

#[test]
fn test_create_release_unknown_commit() {
    let dir = setup_release_repo();

    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    let err = repo
        .create_tag(&ReleaseRequest::new(
            "2.0.0",
            "0000000000000000000000000000000000000bad",
            "new feature",
        ))
        .unwrap_err();
    assert!(matches!(err, ProviderError::CommitNotFound(_)));
}

#[test]
fn test_create_release_with_custom_prefix() {
    let dir = setup_release_repo();
    let head = master_head(dir.path());

    let mut config = config_for(dir.path(), &TAGGER);
    config.insert("tag_prefix".to_string(), "release-".to_string());
    let mut repo = ReleaseRepository::init(&config).unwrap();

    let tag = repo
        .create_tag(&ReleaseRequest::new("3.1.0", head.clone(), "custom"))
        .unwrap();
    assert_eq!(tag, "release-3.1.0");

    let releases = repo.get_releases("").unwrap();
    assert_eq!(releases.len(), 31);
    assert_eq!(releases[0].tag, "release-3.1.0");
    assert_eq!(releases[0].version.to_string(), "3.1.0");
    assert_eq!(releases[0].sha, head);

    let filtered = repo.get_releases("^release-").unwrap();
    assert_eq!(filtered.len(), 1);
}

#[test]
fn test_create_release_pushes_branch() {
    let dir = setup_release_repo();
    let remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());

    let mut config = config_for(dir.path(), &TAGGER);
    config.insert("push_branch".to_string(), "true".to_string());
    let mut repo = ReleaseRepository::init(&config).unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", head.clone(), "new feature"))
        .unwrap();

    assert_eq!(master_head(remote.path()), head);
}

#[test]
fn test_fetch_tags() {
    let dir = setup_release_repo();
    let remote = add_bare_remote(dir.path(), "origin");
    let head = master_head(dir.path());

    // Seed the remote with the history, then tag there only
    let mut repo = ReleaseRepository::init(&config_for(dir.path(), &TAGGER)).unwrap();
    repo.create_release(&ReleaseRequest::new("2.0.0", head.clone(), "local"))
        .unwrap();
    {
        let bare = Repository::open(remote.path()).unwrap();
        let object = bare.revparse_single(&head).unwrap();
        bare.tag_lightweight("v3.0.0", &object, false).unwrap();
    }
    assert_eq!(repo.backend().find_tag("v3.0.0").unwrap(), None);

    repo.fetch_tags().unwrap();

    let fetched = repo.backend().find_tag("v3.0.0").unwrap().unwrap();
    assert_eq!(fetched.commit_sha, Some(head));
    assert_eq!(repo.get_releases("").unwrap()[0].tag, "v3.0.0");
}
