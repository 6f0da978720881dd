use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use provider_git::{config, ui, ProviderError, ReleaseRepository, ReleaseRequest};

#[derive(clap::Parser)]
#[command(
    name = "provider-git",
    version,
    about = "Read and create releases recorded as git tags"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long = "set",
        value_name = "KEY=VALUE",
        help = "Override a configuration value (repeatable)"
    )]
    set: Vec<String>,

    #[arg(long, help = "Print results as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the default branch
    Info,

    /// List releases, newest version first
    Releases {
        #[arg(short, long, default_value = "", help = "Regex over tag names")]
        pattern: String,
    },

    /// List commits on a branch, most recent first
    Commits {
        #[arg(short, long, help = "Branch to walk (default: the default branch)")]
        branch: Option<String>,

        #[arg(long, default_value = "", help = "Stop before this commit")]
        since: String,
    },

    /// Tag a commit as a new release and push the tag
    Release {
        /// Version to release, e.g. 2.0.0
        #[arg(long = "version", value_name = "VERSION")]
        new_version: String,

        #[arg(long, help = "Commit to tag")]
        sha: String,

        #[arg(long, conflicts_with = "changelog_file", help = "Tag message")]
        changelog: Option<String>,

        #[arg(long, help = "Read the tag message from a file")]
        changelog_file: Option<PathBuf>,

        #[arg(short, long, help = "Replace an existing tag locally and on the remote")]
        force: bool,
    },

    /// Fetch tags from the configured remote
    Fetch,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut settings =
        config::load_config(args.config.as_deref()).context("Error loading config")?;

    for entry in &args.set {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Invalid --set '{}', expected KEY=VALUE", entry))?;
        settings.insert(key.trim().to_string(), value.to_string());
    }

    let mut repo = ReleaseRepository::init(&settings)?;

    match args.command {
        Command::Info => {
            let info = repo.get_info()?;
            if args.json {
                print_json(&info)?;
            } else {
                println!("default branch: {}", info.default_branch);
            }
        }
        Command::Releases { pattern } => {
            let releases = repo.get_releases(&pattern)?;
            if args.json {
                print_json(&releases)?;
            } else {
                ui::display_releases(&releases);
            }
        }
        Command::Commits { branch, since } => {
            let branch = match branch {
                Some(branch) => branch,
                None => repo.get_info()?.default_branch,
            };
            let commits = repo.get_commits(&since, &branch)?;
            if args.json {
                print_json(&commits)?;
            } else {
                ui::display_commits(&commits, &branch);
            }
        }
        Command::Release {
            new_version,
            sha,
            changelog,
            changelog_file,
            force,
        } => {
            let changelog = match (changelog, changelog_file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("Cannot read changelog {}", path.display()))?,
                (None, None) => String::new(),
            };
            let request = ReleaseRequest::new(&new_version, sha, changelog).with_force(force);

            ui::display_status(&format!("Creating release {}", new_version));
            let tag = repo.create_tag(&request)?;
            ui::display_success(&format!("Created tag: {}", tag));

            match repo.push_tag(&tag, force) {
                Ok(()) => ui::display_success(&format!(
                    "Pushed tag: {} to {}",
                    tag,
                    repo.config().remote_name
                )),
                Err(e) => {
                    if let ProviderError::Push {
                        remote, refspecs, ..
                    } = &e
                    {
                        ui::display_status(&ui::format_push_retry(&tag, remote, refspecs));
                    }
                    return Err(e.into());
                }
            }
        }
        Command::Fetch => {
            repo.fetch_tags()?;
            ui::display_success(&format!(
                "Fetched tags from {}",
                repo.config().remote_name
            ));
        }
    }

    Ok(())
}
