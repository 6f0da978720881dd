//! Terminal output for the host binary.
//!
//! `format_*` functions build plain lines and are tested; `display_*`
//! functions add styling and print.

use console::style;

use crate::domain::{Commit, Release};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// One line per release: tag, version, short SHA, date and a beta marker.
pub fn format_release(release: &Release) -> String {
    format!(
        "{:<24} {:<20} {} {}{}",
        release.tag,
        release.version.to_string(),
        short_sha(&release.sha),
        release.timestamp.format("%Y-%m-%d"),
        if release.prerelease {
            " (prerelease)"
        } else {
            ""
        }
    )
}

/// One line per commit: short SHA, first message line, author.
pub fn format_commit(commit: &Commit) -> String {
    let summary = commit.summary();
    let summary = if summary.chars().count() > 72 {
        let cut: String = summary.chars().take(69).collect();
        format!("{}...", cut)
    } else {
        summary.to_string()
    };
    format!(
        "{} {} <{}>",
        short_sha(&commit.sha),
        summary,
        commit.author.name
    )
}

pub fn display_releases(releases: &[Release]) {
    if releases.is_empty() {
        display_status("No releases found");
        return;
    }
    println!("{}", style(format!("{} releases:", releases.len())).bold());
    for release in releases {
        println!("  {}", format_release(release));
    }
}

pub fn display_commits(commits: &[Commit], branch: &str) {
    println!(
        "{}",
        style(format!("{} commits on '{}':", commits.len(), branch)).bold()
    );
    for commit in commits {
        println!("  {}", format_commit(commit));
    }
}

/// Tell the user how to finish a release whose push failed.
///
/// `refspecs` are the ones the failed push used, force marker included.
pub fn format_push_retry(tag: &str, remote: &str, refspecs: &[String]) -> String {
    format!(
        "Tag {} exists locally but was not pushed. Retry with: git push {} {}",
        tag,
        remote,
        refspecs.join(" ")
    )
}
