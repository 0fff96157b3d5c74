//! Fork ensurer.

use crate::error::{ForkPrError, Result};
use crate::github::{GitHubRepo, Lookup, RepoOps};
use crate::sync::CurrentContext;

/// What the fork ensurer found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkStatus {
    /// The actor already owns a repository with the base repository's name.
    Existing(GitHubRepo),
    /// A fork was requested. GitHub populates it asynchronously.
    Created(GitHubRepo),
    /// No fork exists and none was created (dry run).
    Missing,
}

impl ForkStatus {
    pub fn repo(&self) -> Option<&GitHubRepo> {
        match self {
            ForkStatus::Existing(repo) | ForkStatus::Created(repo) => Some(repo),
            ForkStatus::Missing => None,
        }
    }
}

/// Look up `actor/<repo name>` without creating anything.
pub fn find_fork<C: RepoOps + ?Sized>(client: &C, ctx: &CurrentContext) -> Result<ForkStatus> {
    let status = match client
        .get_repo(&ctx.head_repo())
        .map_err(ForkPrError::during("look up fork"))?
    {
        Lookup::Found(repo) => ForkStatus::Existing(repo),
        Lookup::NotFound => ForkStatus::Missing,
    };
    Ok(status)
}

/// Make sure the actor owns a fork of the base repository.
///
/// Does not wait for a freshly created fork to become readable.
pub fn ensure_fork<C: RepoOps + ?Sized>(client: &C, ctx: &CurrentContext) -> Result<ForkStatus> {
    match find_fork(client, ctx)? {
        ForkStatus::Missing => {
            let repo = client
                .create_fork(&ctx.base())
                .map_err(ForkPrError::during("create fork"))?;
            tracing::info!(fork = %repo.full_name, "Created fork");
            Ok(ForkStatus::Created(repo))
        }
        existing => {
            tracing::debug!(fork = %ctx.head_repo(), "Fork already exists");
            Ok(existing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryGitHub;
    use crate::types::RepoId;

    fn setup() -> (MemoryGitHub, CurrentContext) {
        let gh = MemoryGitHub::new("octo");
        let base = RepoId::new("upstream", "project");
        gh.add_repo(&base, "main", &[]);
        let ctx = CurrentContext::resolve(&gh, &base).unwrap();
        gh.clear_calls();
        (gh, ctx)
    }

    #[test]
    fn test_creates_fork_when_absent() {
        let (gh, ctx) = setup();
        let status = ensure_fork(&gh, &ctx).unwrap();
        assert!(matches!(status, ForkStatus::Created(_)));
        assert!(gh.has_repo(&RepoId::new("octo", "project")));
        assert_eq!(gh.call_names(), vec!["get_repo", "create_fork"]);
    }

    #[test]
    fn test_existing_fork_is_reused() {
        let (gh, ctx) = setup();
        ensure_fork(&gh, &ctx).unwrap();
        gh.clear_calls();

        let status = ensure_fork(&gh, &ctx).unwrap();
        assert_eq!(
            status.repo().map(|r| r.full_name.as_str()),
            Some("octo/project")
        );
        assert!(matches!(status, ForkStatus::Existing(_)));
        assert_eq!(gh.call_names(), vec!["get_repo"]);
    }

    #[test]
    fn test_lookup_errors_other_than_404_propagate() {
        let (gh, ctx) = setup();
        gh.fail_on("get_repo", 500);
        let err = ensure_fork(&gh, &ctx).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!gh.call_names().contains(&"create_fork"));
    }

    #[test]
    fn test_find_fork_never_creates() {
        let (gh, ctx) = setup();
        assert_eq!(find_fork(&gh, &ctx).unwrap(), ForkStatus::Missing);
        assert!(gh.calls().iter().all(|c| !c.is_write()));
    }
}
