use git2::{Oid, Repository, Sort};

use crate::domain::commit::git_time_to_utc;
use crate::domain::{Author, Commit};
use crate::error::Result;

/// Walks a branch's ancestry, most recent commit first.
///
/// The walk is a full topological linearization of the DAG with commit time
/// breaking ties, so repeated walks over unchanged history agree.
pub struct CommitWalker<'r> {
    repo: &'r Repository,
    sorting: Sort,
}

impl<'r> CommitWalker<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        CommitWalker {
            repo,
            sorting: Sort::TOPOLOGICAL | Sort::TIME,
        }
    }

    /// Collect commits from `tip` until `since` is reached.
    ///
    /// `since` itself is not included. When it is `None`, or not an ancestor
    /// of `tip`, the whole reachable history is returned.
    pub fn walk(&self, tip: Oid, since: Option<Oid>) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(self.sorting)?;
        revwalk.push(tip)?;

        let mut commits = Vec::new();
        let mut reached_boundary = false;

        for oid in revwalk {
            let oid = oid?;

            if Some(oid) == since {
                reached_boundary = true;
                break;
            }

            let commit = self.repo.find_commit(oid)?;
            commits.push(to_commit(&commit));
        }

        if let (Some(since), false) = (since, reached_boundary) {
            log::debug!(
                "{} is not an ancestor of {}, returned full history",
                since,
                tip
            );
        }
        log::debug!("walked {} commits from {}", commits.len(), tip);

        Ok(commits)
    }
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let author = commit.author();
    Commit {
        sha: commit.id().to_string(),
        raw_message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        author: Author {
            name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        },
        timestamp: git_time_to_utc(author.when()),
    }
}
