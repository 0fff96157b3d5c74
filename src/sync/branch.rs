//! Branch creation and update in the fork.

use crate::error::{ForkPrError, Result};
use crate::github::{GitDataOps, GitRef};
use crate::types::{RepoId, Sha};

/// Whether the head branch was created or moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSync {
    Created(GitRef),
    Updated(GitRef),
}

impl BranchSync {
    pub fn git_ref(&self) -> &GitRef {
        match self {
            BranchSync::Created(r) | BranchSync::Updated(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, BranchSync::Created(_))
    }
}

/// Pick the ref named exactly `refs/heads/<branch>`.
///
/// The matching-refs listing is a prefix match, so `feature` also returns
/// `feature-2`.
pub fn find_exact_ref<'a>(refs: &'a [GitRef], branch: &str) -> Option<&'a GitRef> {
    let wanted = format!("refs/heads/{}", branch);
    refs.iter().find(|r| r.name == wanted)
}

/// Point `branch` in `repo` at `sha`, creating it if needed.
///
/// Without `force` an update must be a fast-forward; GitHub rejects anything
/// else.
pub fn sync_branch<C: GitDataOps + ?Sized>(
    client: &C,
    repo: &RepoId,
    branch: &str,
    sha: &Sha,
    force: bool,
) -> Result<BranchSync> {
    let refs = client
        .list_matching_refs(repo, branch)
        .map_err(ForkPrError::during("list matching refs"))?;

    match find_exact_ref(&refs, branch) {
        Some(existing) => {
            tracing::debug!(
                branch,
                from = %existing.object.sha.short(),
                to = %sha.short(),
                force,
                "Updating branch"
            );
            let updated = client
                .update_ref(repo, branch, sha, force)
                .map_err(ForkPrError::during("update branch"))?;
            tracing::info!(repo = %repo, branch, sha = %sha.short(), "Updated branch");
            Ok(BranchSync::Updated(updated))
        }
        None => {
            let created = client
                .create_ref(repo, branch, sha)
                .map_err(ForkPrError::during("create branch"))?;
            tracing::info!(repo = %repo, branch, sha = %sha.short(), "Created branch");
            Ok(BranchSync::Created(created))
        }
    }
}
