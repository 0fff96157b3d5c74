//! GitHub API integration.
//!
//! Operations are grouped into traits by concern so the sync steps can run
//! against either the real API (`GitHubClient`) or an in-process stand-in
//! used by the tests:
//! - `RepoOps`: the authenticated user, repository lookup, fork creation
//! - `GitDataOps`: refs, commits, trees, blobs and file contents
//! - `PullRequestOps`: listing, creating and updating pull requests
//!
//! # Example
//!
//! ```rust,no_run
//! use fork_pr::github::{GitHubClient, RepoOps};
//!
//! let client = GitHubClient::from_env()?;
//! let user = client.authenticated_user()?;
//! println!("authenticated as {}", user.login);
//! # Ok::<(), fork_pr::error::ForkPrError>(())
//! ```

mod client;
mod git_data;
mod lookup;
mod memory;
mod pr;
mod repos;

pub use client::{DEFAULT_API_URL, GitHubClient, TOKEN_ENV, token_from_env};
pub use git_data::{
    FILE_MODE, GitCommit, GitDataOps, GitObject, GitRef, GitTree, GitTreeItem, ObjectRef,
    TreeEntry,
};
pub use lookup::Lookup;
#[doc(hidden)]
pub use memory::{Call, MemoryGitHub, PullRecord};
pub use pr::{CreatePullRequest, PullRequest, PullRequestOps, PullRequestRef, UpdatePullRequest};
pub use repos::{GitHubRepo, GitHubUser, RepoOps};

/// Everything the fork-and-pull workflow needs from GitHub.
pub trait GitHubApi: RepoOps + GitDataOps + PullRequestOps {}

impl<T: RepoOps + GitDataOps + PullRequestOps + ?Sized> GitHubApi for T {}
