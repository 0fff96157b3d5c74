//! GitHub user and repository operations.

use crate::error::Result;
use crate::github::{GitHubClient, Lookup};
use crate::types::RepoId;
use serde::{Deserialize, Serialize};

/// The authenticated user (or a repository owner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Repository information from GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
    pub default_branch: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl GitHubRepo {
    pub fn id(&self) -> RepoId {
        RepoId::new(&self.owner.login, &self.name)
    }
}

/// User and repository lookups, plus fork creation.
pub trait RepoOps {
    /// Get the user the token belongs to.
    fn authenticated_user(&self) -> Result<GitHubUser>;

    /// Get a specific repository.
    fn get_repo(&self, repo: &RepoId) -> Result<Lookup<GitHubRepo>>;

    /// Fork a repository into the authenticated user's account.
    ///
    /// GitHub creates forks asynchronously; the returned repository may not
    /// be fully populated yet.
    fn create_fork(&self, repo: &RepoId) -> Result<GitHubRepo>;
}

impl RepoOps for GitHubClient {
    fn authenticated_user(&self) -> Result<GitHubUser> {
        self.get("/user")
    }

    fn get_repo(&self, repo: &RepoId) -> Result<Lookup<GitHubRepo>> {
        let endpoint = format!("/repos/{}/{}", repo.owner, repo.name);
        self.lookup(&endpoint)
    }

    fn create_fork(&self, repo: &RepoId) -> Result<GitHubRepo> {
        let endpoint = format!("/repos/{}/{}/forks", repo.owner, repo.name);
        self.post(&endpoint, &serde_json::json!({}))
    }
}
