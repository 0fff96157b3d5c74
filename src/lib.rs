//! # fork-pr
//!
//! Propose file changes to a GitHub repository you cannot push to.
//!
//! A run forks the target repository under the authenticated account (if it
//! is not forked yet), commits the requested additions and removals on top of
//! the target's default branch, points a branch in the fork at that commit
//! and opens a pull request back to the target, or refreshes the one that is
//! already open. Re-running with the same inputs is safe: files that already
//! match the target are skipped, and when nothing differs no commit, branch
//! update or pull request change is made.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fork_pr::prelude::*;
//!
//! let client = GitHubClient::from_env()?;
//! let report = ForkPullRequest::new(RepoId::parse("octo/project")?, "update-readme")
//!     .title("Update README")
//!     .body("Generated by the docs pipeline.")
//!     .add_file("README.md", "README.md")?
//!     .remove_file("docs/obsolete.md")?
//!     .apply(&client)?;
//!
//! match report.pull_request() {
//!     Some(pr) => println!("{}", pr.html_url),
//!     None => println!("nothing to change"),
//! }
//! # Ok::<(), fork_pr::error::ForkPrError>(())
//! ```
//!
//! ## Dry Runs
//!
//! ```rust,no_run
//! use fork_pr::prelude::*;
//!
//! let client = GitHubClient::from_env()?;
//! let report = ForkPullRequest::new(RepoId::parse("octo/project")?, "update-readme")
//!     .title("Update README")
//!     .add_file("README.md", "README.md")?
//!     .dry_run(true)
//!     .apply(&client)?;
//!
//! for path in report.changes.paths() {
//!     println!("would change {}", path);
//! }
//! # Ok::<(), fork_pr::error::ForkPrError>(())
//! ```

pub mod error;
pub mod github;
pub mod sync;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ForkPrError, Result};
    pub use crate::github::{
        GitDataOps, GitHubApi, GitHubClient, GitHubRepo, PullRequest, PullRequestOps, RepoOps,
    };
    pub use crate::sync::{
        BranchSync, ChangeSet, DuplicatePolicy, FileChange, FileOperation, ForkPullRequest,
        ForkStatus, PullSync, SyncReport,
    };
    pub use crate::types::{RepoId, Sha};
}

pub use prelude::*;
