//! The fork, commit, branch and pull request workflow.
//!
//! A run resolves the actor and the base repository, makes sure the actor
//! owns a fork, stages the requested file changes against the base branch
//! tip, commits them into the fork, points the head branch at that commit
//! and finally opens or refreshes the pull request. When no change differs
//! from the base branch the run stops after staging and writes nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use fork_pr::github::GitHubClient;
//! use fork_pr::sync::ForkPullRequest;
//! use fork_pr::types::RepoId;
//!
//! let client = GitHubClient::from_env()?;
//! let report = ForkPullRequest::new(RepoId::parse("octo/project")?, "docs-sync")
//!     .title("Sync README")
//!     .add_file("README.md", "docs/README.md")?
//!     .apply(&client)?;
//!
//! if let Some(pr) = report.pull_request() {
//!     println!("{}", pr.html_url);
//! }
//! # Ok::<(), fork_pr::error::ForkPrError>(())
//! ```

mod branch;
mod changes;
mod context;
mod fork;
mod pull;
mod tree;

pub use branch::{BranchSync, find_exact_ref, sync_branch};
pub use changes::{FileChange, FileOperation, normalize_destination};
pub use context::CurrentContext;
pub use fork::{ForkStatus, ensure_fork, find_fork};
pub use pull::{DuplicatePolicy, PullRequestSpec, PullSync, sync_pull_request};
pub use tree::{ChangeSet, SkipReason, StagedContent, StagedEntry, commit_changes, stage_changes};

use std::path::PathBuf;

use crate::error::{ForkPrError, Result};
use crate::github::{GitCommit, GitHubApi, PullRequest};
use crate::types::RepoId;

/// A configured run of the workflow.
#[derive(Debug, Clone)]
pub struct ForkPullRequest {
    base: RepoId,
    branch: String,
    title: String,
    body: String,
    message: Option<String>,
    changes: Vec<FileChange>,
    force: bool,
    dry_run: bool,
    duplicates: DuplicatePolicy,
}

impl ForkPullRequest {
    /// Target `base`, publishing changes on the fork's `branch`.
    pub fn new(base: RepoId, branch: impl Into<String>) -> Self {
        Self {
            base,
            branch: branch.into(),
            title: String::new(),
            body: String::new(),
            message: None,
            changes: Vec::new(),
            force: true,
            dry_run: false,
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Commit message. Defaults to the pull request title.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn change(mut self, change: FileChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn changes(mut self, changes: impl IntoIterator<Item = FileChange>) -> Self {
        self.changes.extend(changes);
        self
    }

    /// Write the local file `source` to `destination`.
    pub fn add_file(self, source: impl Into<PathBuf>, destination: &str) -> Result<Self> {
        Ok(self.change(FileChange::add(source, destination)?))
    }

    /// Delete `destination`.
    pub fn remove_file(self, destination: &str) -> Result<Self> {
        Ok(self.change(FileChange::remove(destination)?))
    }

    /// Allow non-fast-forward updates of the head branch. On by default:
    /// commits are built on the base tip, not on the branch head.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Only read from GitHub and report what would change.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.branch.trim().is_empty() {
            return Err(ForkPrError::InvalidConfig("branch must not be empty".into()));
        }
        if self.title.trim().is_empty() {
            return Err(ForkPrError::InvalidConfig("title must not be empty".into()));
        }
        if self.changes.is_empty() {
            return Err(ForkPrError::InvalidConfig("no files to add or remove".into()));
        }
        Ok(())
    }

    /// Run the workflow against `client`.
    pub fn apply<C: GitHubApi + ?Sized>(&self, client: &C) -> Result<SyncReport> {
        self.validate()?;

        let ctx = CurrentContext::resolve(client, &self.base)?;
        let head = ctx.head_repo();
        let fork = if self.dry_run {
            find_fork(client, &ctx)?
        } else {
            ensure_fork(client, &ctx)?
        };

        let changes = stage_changes(client, &ctx, &self.changes)?;
        let mut report = SyncReport {
            base: ctx.base(),
            head: head.clone(),
            fork,
            changes,
            commit: None,
            branch: None,
            pull: None,
            dry_run: self.dry_run,
        };

        if self.dry_run {
            tracing::info!(
                staged = report.changes.len(),
                branch = %self.branch,
                "Dry run, nothing written"
            );
            return Ok(report);
        }

        let message = self.message.as_deref().unwrap_or(&self.title);
        report.commit = commit_changes(client, &ctx, &head, &report.changes, message)?;
        let Some(commit) = &report.commit else {
            tracing::info!("No changes to commit");
            return Ok(report);
        };

        report.branch = Some(sync_branch(
            client,
            &head,
            &self.branch,
            &commit.sha,
            self.force,
        )?);

        let spec = PullRequestSpec {
            title: self.title.clone(),
            body: self.body.clone(),
            base_branch: ctx.default_branch().to_string(),
        };
        report.pull = Some(sync_pull_request(
            client,
            &report.base,
            &ctx.head_label(&self.branch),
            &spec,
            self.duplicates,
        )?);

        Ok(report)
    }
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub base: RepoId,
    pub head: RepoId,
    pub fork: ForkStatus,
    pub changes: ChangeSet,
    pub commit: Option<GitCommit>,
    pub branch: Option<BranchSync>,
    pub pull: Option<PullSync>,
    pub dry_run: bool,
}

impl SyncReport {
    /// True when no change differed from the base branch.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn pull_request(&self) -> Option<&PullRequest> {
        self.pull.as_ref().map(PullSync::pull_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryGitHub;

    #[test]
    fn test_validation_happens_before_any_request() {
        let gh = MemoryGitHub::new("octo");
        let base = RepoId::new("upstream", "project");

        let err = ForkPullRequest::new(base.clone(), "docs")
            .remove_file("a.txt")
            .unwrap()
            .apply(&gh)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: title must not be empty");

        let err = ForkPullRequest::new(base.clone(), " ")
            .title("t")
            .remove_file("a.txt")
            .unwrap()
            .apply(&gh)
            .unwrap_err();
        assert!(matches!(err, ForkPrError::InvalidConfig(_)));

        let err = ForkPullRequest::new(base, "docs").title("t").apply(&gh).unwrap_err();
        assert!(err.to_string().contains("no files"));
        assert!(gh.calls().is_empty());
    }

    #[test]
    fn test_commit_message_defaults_to_title() {
        let gh = MemoryGitHub::new("octo");
        let base = RepoId::new("upstream", "project");
        gh.add_repo(&base, "main", &[("a.txt", b"a")]);

        let report = ForkPullRequest::new(base.clone(), "cleanup")
            .title("Remove a.txt")
            .remove_file("a.txt")
            .unwrap()
            .apply(&gh)
            .unwrap();
        assert_eq!(report.commit.map(|c| c.message).as_deref(), Some("Remove a.txt"));

        gh.push_files(&base, "main", &[("b.txt", Some(&b"b"[..]))]).unwrap();
        let report = ForkPullRequest::new(base, "cleanup")
            .title("Remove b.txt")
            .message("chore: drop b.txt")
            .remove_file("b.txt")
            .unwrap()
            .apply(&gh)
            .unwrap();
        assert_eq!(
            report.commit.map(|c| c.message).as_deref(),
            Some("chore: drop b.txt")
        );
    }
}
