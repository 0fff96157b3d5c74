//! Pull request creation and update.

use crate::error::{ForkPrError, Result};
use crate::github::{CreatePullRequest, PullRequest, PullRequestOps, UpdatePullRequest};
use crate::types::RepoId;

/// What to do when more than one open pull request shares the head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Warn and update the first one GitHub lists.
    #[default]
    UpdateFirst,
    /// Refuse to touch any of them.
    Fail,
}

/// Title, body and target branch of the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSpec {
    pub title: String,
    pub body: String,
    pub base_branch: String,
}

/// Whether a pull request was opened or refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullSync {
    Created(PullRequest),
    Updated(PullRequest),
}

impl PullSync {
    pub fn pull_request(&self) -> &PullRequest {
        match self {
            PullSync::Created(pr) | PullSync::Updated(pr) => pr,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, PullSync::Created(_))
    }
}

/// Open a pull request from `head` (`owner:branch`) into `base`, or update
/// the open one.
///
/// Both paths ask GitHub to let maintainers push to the head branch.
pub fn sync_pull_request<C: PullRequestOps + ?Sized>(
    client: &C,
    base: &RepoId,
    head: &str,
    spec: &PullRequestSpec,
    policy: DuplicatePolicy,
) -> Result<PullSync> {
    let open = client
        .list_pull_requests(base, head)
        .map_err(ForkPrError::during("list pull requests"))?;

    if open.len() > 1 {
        let numbers: Vec<u64> = open.iter().map(|pr| pr.number).collect();
        if policy == DuplicatePolicy::Fail {
            return Err(ForkPrError::DuplicatePullRequests {
                head: head.to_string(),
                numbers,
            });
        }
        tracing::warn!(
            head,
            count = numbers.len(),
            updating = numbers[0],
            "Multiple open pull requests share this head"
        );
    }

    match open.first() {
        Some(existing) => {
            let update = UpdatePullRequest::new(&spec.title, &spec.body, &spec.base_branch)
                .maintainer_can_modify();
            let pr = client
                .update_pull_request(base, existing.number, update)
                .map_err(ForkPrError::during("update pull request"))?;
            tracing::info!(number = pr.number, url = %pr.html_url, "Updated pull request");
            Ok(PullSync::Updated(pr))
        }
        None => {
            let create =
                CreatePullRequest::new(&spec.title, &spec.body, head, &spec.base_branch)
                    .maintainer_can_modify();
            let pr = client
                .create_pull_request(base, create)
                .map_err(ForkPrError::during("create pull request"))?;
            tracing::info!(number = pr.number, url = %pr.html_url, "Created pull request");
            Ok(PullSync::Created(pr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryGitHub;

    fn base() -> RepoId {
        RepoId::new("upstream", "project")
    }

    fn spec() -> PullRequestSpec {
        PullRequestSpec {
            title: "Sync docs".into(),
            body: "Automated".into(),
            base_branch: "main".into(),
        }
    }

    fn server_with_head() -> MemoryGitHub {
        let gh = MemoryGitHub::new("octo");
        let tip = gh.add_repo(&base(), "main", &[]);
        gh.add_repo(&RepoId::new("octo", "project"), "main", &[]);
        gh.add_branch(&RepoId::new("octo", "project"), "docs", &tip).unwrap();
        gh
    }

    #[test]
    fn test_creates_when_none_open() {
        let gh = server_with_head();
        let result =
            sync_pull_request(&gh, &base(), "octo:docs", &spec(), DuplicatePolicy::default())
                .unwrap();
        assert!(result.is_created());

        let pulls = gh.pulls();
        assert_eq!(pulls.len(), 1);
        assert!(pulls[0].maintainer_can_modify);
        assert_eq!(pulls[0].pull.base.ref_name, "main");
        assert_eq!(pulls[0].pull.body.as_deref(), Some("Automated"));
    }

    #[test]
    fn test_updates_existing() {
        let gh = server_with_head();
        let number = gh.add_pull(&base(), "octo:docs", "Old title");

        let result =
            sync_pull_request(&gh, &base(), "octo:docs", &spec(), DuplicatePolicy::default())
                .unwrap();
        assert_eq!(result.pull_request().number, number);
        assert!(!result.is_created());

        let pulls = gh.pulls();
        assert_eq!(pulls[0].pull.title, "Sync docs");
        assert!(pulls[0].maintainer_can_modify);
    }

    #[test]
    fn test_duplicates_update_first_by_default() {
        let gh = server_with_head();
        let first = gh.add_pull(&base(), "octo:docs", "One");
        let second = gh.add_pull(&base(), "octo:docs", "Two");

        sync_pull_request(&gh, &base(), "octo:docs", &spec(), DuplicatePolicy::UpdateFirst)
            .unwrap();
        let pulls = gh.pulls();
        let title = |n: u64| {
            pulls
                .iter()
                .find(|p| p.pull.number == n)
                .map(|p| p.pull.title.clone())
        };
        assert_eq!(title(first).as_deref(), Some("Sync docs"));
        assert_eq!(title(second).as_deref(), Some("Two"));
    }

    #[test]
    fn test_duplicates_fail_when_asked() {
        let gh = server_with_head();
        gh.add_pull(&base(), "octo:docs", "One");
        gh.add_pull(&base(), "octo:docs", "Two");
        gh.clear_calls();

        let err = sync_pull_request(&gh, &base(), "octo:docs", &spec(), DuplicatePolicy::Fail)
            .unwrap_err();
        assert!(matches!(
            err,
            ForkPrError::DuplicatePullRequests { ref numbers, .. } if numbers == &vec![1, 2]
        ));
        assert_eq!(gh.call_names(), vec!["list_pull_requests"]);
    }

    #[test]
    fn test_other_heads_are_ignored() {
        let gh = server_with_head();
        gh.add_pull(&base(), "someone:docs", "Theirs");

        let result =
            sync_pull_request(&gh, &base(), "octo:docs", &spec(), DuplicatePolicy::default())
                .unwrap();
        assert!(result.is_created());
        assert_eq!(gh.pulls().len(), 2);
    }
}
