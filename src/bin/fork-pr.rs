//! CLI for fork-pr.

use anyhow::{Context, Result};
use clap::Parser;
use fork_pr::github::token_from_env;
use fork_pr::prelude::*;
use fork_pr::sync::StagedContent;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fork-pr")]
#[command(
    author,
    version,
    about = "Fork a GitHub repository, commit file changes and open a pull request",
    long_about = None
)]
struct Cli {
    /// Repository to propose changes to (owner/repo or a GitHub URL)
    #[arg(long)]
    repo: String,

    /// Branch in your fork that carries the changes
    #[arg(long)]
    branch: String,

    /// Pull request title
    #[arg(long)]
    title: String,

    /// Pull request body
    #[arg(long, default_value = "")]
    body: String,

    /// Commit message (defaults to the title)
    #[arg(long)]
    message: Option<String>,

    /// Overwrite the branch even when the new commit does not descend from it (default)
    #[arg(long, overrides_with = "no_force")]
    force: bool,

    /// Only move the branch forward; fail if it would have to be overwritten
    #[arg(long, overrides_with = "force")]
    no_force: bool,

    /// Local file to add (pairs with --destfile)
    #[arg(long = "addfile", value_name = "PATH")]
    add_files: Vec<PathBuf>,

    /// Destination path in the repository for the matching --addfile
    #[arg(long = "destfile", value_name = "PATH")]
    dest_files: Vec<String>,

    /// Path to remove from the repository
    #[arg(long = "rmfile", value_name = "PATH")]
    remove_files: Vec<String>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Fail instead of updating the first of several matching pull requests
    #[arg(long)]
    fail_on_duplicate_prs: bool,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// SOURCE DEST: a local file and where to put it in the repository
    #[arg(value_name = "SOURCE DEST")]
    files: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let token = match token_from_env() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    match run(cli, token) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "fork_pr=debug" } else { "fork_pr=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, token: String) -> Result<()> {
    let base = RepoId::parse(&cli.repo)?;
    let changes = FileChange::from_args(
        &cli.files,
        &cli.add_files,
        &cli.dest_files,
        &cli.remove_files,
    )?;

    let client = match &cli.api_url {
        Some(url) => GitHubClient::with_enterprise(token, url),
        None => GitHubClient::new(token),
    }
    .context("Failed to create GitHub client")?;

    let policy = if cli.fail_on_duplicate_prs {
        DuplicatePolicy::Fail
    } else {
        DuplicatePolicy::UpdateFirst
    };

    let mut request = ForkPullRequest::new(base, cli.branch)
        .title(cli.title)
        .body(cli.body)
        .changes(changes)
        .force(cli.force || !cli.no_force)
        .dry_run(cli.dry_run)
        .duplicate_policy(policy);
    if let Some(message) = cli.message {
        request = request.message(message);
    }

    let report = request.apply(&client)?;
    print_report(&report);
    tracing::info!("Done!");
    Ok(())
}

fn print_report(report: &SyncReport) {
    if report.dry_run {
        if let ForkStatus::Missing = report.fork {
            println!("Would fork {} to {}", report.base, report.head);
        }
        if report.is_noop() {
            println!("No changes");
        }
        for entry in &report.changes.entries {
            match entry.content {
                StagedContent::Write(_) => println!("Would write {}", entry.path),
                StagedContent::Delete => println!("Would remove {}", entry.path),
            }
        }
        return;
    }

    if report.is_noop() {
        println!("No changes");
        return;
    }

    if let Some(pull) = &report.pull {
        let verb = if pull.is_created() { "Created" } else { "Updated" };
        let pr = pull.pull_request();
        println!("{} pull request #{}: {}", verb, pr.number, pr.html_url);
    }
}
