//! Identity and target resolution.

use crate::error::{ForkPrError, Result};
use crate::github::{GitCommit, GitDataOps, GitHubRepo, GitHubUser, GitRef, GitTree, Lookup, RepoOps};
use crate::types::{RepoId, Sha};

/// Everything a run needs to know about the actor and the base repository.
///
/// Resolved once at the start of a run and never refreshed.
#[derive(Debug, Clone)]
pub struct CurrentContext {
    pub user: GitHubUser,
    pub repo: GitHubRepo,
    pub base_ref: GitRef,
    pub commit: GitCommit,
    pub tree: GitTree,
}

impl CurrentContext {
    /// Look up the authenticated user and the tip of the base repository's
    /// default branch (ref, commit, tree).
    pub fn resolve<C>(client: &C, base: &RepoId) -> Result<Self>
    where
        C: RepoOps + GitDataOps + ?Sized,
    {
        let user = client
            .authenticated_user()
            .map_err(ForkPrError::during("get current user"))?;

        let repo = match client
            .get_repo(base)
            .map_err(ForkPrError::during("get base repo"))?
        {
            Lookup::Found(repo) => repo,
            Lookup::NotFound => {
                return Err(ForkPrError::during("get base repo")(ForkPrError::Api {
                    status: 404,
                    message: format!("{} not found", base),
                }));
            }
        };

        let during = ForkPrError::during("get base repo default ref");
        let (base_ref, commit, tree) = (|| -> Result<_> {
            let base_ref = client.get_ref(base, &repo.default_branch)?;
            let commit = client.get_commit(base, &base_ref.object.sha)?;
            let tree = client.get_tree(base, &commit.tree.sha)?;
            Ok((base_ref, commit, tree))
        })()
        .map_err(during)?;

        tracing::info!(
            user = %user.login,
            base = %repo.full_name,
            default_branch = %repo.default_branch,
            tip = %base_ref.object.sha.short(),
            "Resolved user and base repository"
        );

        Ok(Self {
            user,
            repo,
            base_ref,
            commit,
            tree,
        })
    }

    /// The base repository, as GitHub names it.
    pub fn base(&self) -> RepoId {
        self.repo.id()
    }

    /// The actor's fork of the base repository.
    pub fn head_repo(&self) -> RepoId {
        RepoId::new(&self.user.login, &self.repo.name)
    }

    /// The `owner:branch` label used as a pull request head.
    pub fn head_label(&self, branch: &str) -> String {
        format!("{}:{}", self.user.login, branch)
    }

    pub fn default_branch(&self) -> &str {
        &self.repo.default_branch
    }

    /// The commit at the tip of the default branch.
    pub fn tip(&self) -> &Sha {
        &self.base_ref.object.sha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryGitHub;

    #[test]
    fn test_resolve_reads_tip_of_default_branch() {
        let gh = MemoryGitHub::new("octo");
        let base = RepoId::new("upstream", "project");
        let tip = gh.add_repo(&base, "trunk", &[("README.md", b"# Project\n")]);

        let ctx = CurrentContext::resolve(&gh, &base).unwrap();
        assert_eq!(ctx.user.login, "octo");
        assert_eq!(ctx.default_branch(), "trunk");
        assert_eq!(ctx.tip(), &tip);
        assert_eq!(ctx.tree.sha, ctx.commit.tree.sha);
        assert_eq!(ctx.head_repo(), RepoId::new("octo", "project"));
        assert_eq!(ctx.head_label("docs"), "octo:docs");
        assert_eq!(
            gh.call_names(),
            vec!["authenticated_user", "get_repo", "get_ref", "get_commit", "get_tree"]
        );
    }

    #[test]
    fn test_missing_base_repo_is_an_error() {
        let gh = MemoryGitHub::new("octo");
        let err = CurrentContext::resolve(&gh, &RepoId::new("nobody", "nothing")).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().starts_with("Failed to get base repo"));
    }

    #[test]
    fn test_user_lookup_failure_names_the_step() {
        let gh = MemoryGitHub::new("octo");
        gh.fail_on("authenticated_user", 401);
        let err = CurrentContext::resolve(&gh, &RepoId::new("a", "b")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get current user");
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()).as_deref(),
            Some("GitHub API error (HTTP 401): injected failure")
        );
    }
}
