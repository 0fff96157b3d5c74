//! Pull request operations using octocrab.

use crate::error::{ForkPrError, Result};
use crate::github::GitHubClient;
use crate::types::RepoId;
use octocrab::models::pulls::PullRequest as OctocrabPR;

/// A pull request on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub state: String,
    pub title: String,
    pub body: Option<String>,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

impl From<OctocrabPR> for PullRequest {
    fn from(pr: OctocrabPR) -> Self {
        Self {
            number: pr.number,
            html_url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
            state: pr.state.map(|s| format!("{:?}", s).to_lowercase()).unwrap_or_default(),
            title: pr.title.unwrap_or_default(),
            body: pr.body,
            head: PullRequestRef {
                label: pr.head.label,
                ref_name: pr.head.ref_field,
                sha: pr.head.sha,
            },
            base: PullRequestRef {
                label: pr.base.label,
                ref_name: pr.base.ref_field,
                sha: pr.base.sha,
            },
        }
    }
}

/// A reference (branch) in a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// `owner:branch`.
    pub label: Option<String>,
    pub ref_name: String,
    pub sha: String,
}

/// Request body for creating a pull request.
#[derive(Debug, Clone)]
pub struct CreatePullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub maintainer_can_modify: Option<bool>,
}

impl CreatePullRequest {
    /// Create a new pull request.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        head: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            head: head.into(),
            base: base.into(),
            maintainer_can_modify: None,
        }
    }

    /// Allow maintainers to modify the pull request.
    pub fn maintainer_can_modify(mut self) -> Self {
        self.maintainer_can_modify = Some(true);
        self
    }
}

/// Fields to overwrite on an existing pull request.
#[derive(Debug, Clone)]
pub struct UpdatePullRequest {
    pub title: String,
    pub body: String,
    pub base: String,
    pub maintainer_can_modify: Option<bool>,
}

impl UpdatePullRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            base: base.into(),
            maintainer_can_modify: None,
        }
    }

    /// Allow maintainers to modify the pull request.
    pub fn maintainer_can_modify(mut self) -> Self {
        self.maintainer_can_modify = Some(true);
        self
    }
}

/// Pull request operations.
pub trait PullRequestOps {
    /// List open pull requests whose head is `owner:branch`.
    fn list_pull_requests(&self, repo: &RepoId, head: &str) -> Result<Vec<PullRequest>>;

    /// Create a new pull request.
    fn create_pull_request(&self, repo: &RepoId, pr: CreatePullRequest) -> Result<PullRequest>;

    /// Overwrite the title, body and base of a pull request.
    fn update_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
        update: UpdatePullRequest,
    ) -> Result<PullRequest>;
}

impl PullRequestOps for GitHubClient {
    fn list_pull_requests(&self, repo: &RepoId, head: &str) -> Result<Vec<PullRequest>> {
        let octocrab = self.octocrab.clone();

        self.block_on(async move {
            let prs = octocrab
                .pulls(&repo.owner, &repo.name)
                .list()
                .state(octocrab::params::State::Open)
                .head(head)
                .per_page(100)
                .send()
                .await
                .map_err(|e| octocrab_error("list pull requests", e))?;

            Ok(prs.items.into_iter().map(PullRequest::from).collect())
        })
    }

    fn create_pull_request(&self, repo: &RepoId, pr: CreatePullRequest) -> Result<PullRequest> {
        let octocrab = self.octocrab.clone();

        self.block_on(async move {
            let pulls = octocrab.pulls(&repo.owner, &repo.name);
            let mut builder = pulls.create(&pr.title, &pr.head, &pr.base).body(&pr.body);

            if let Some(allow) = pr.maintainer_can_modify {
                builder = builder.maintainer_can_modify(allow);
            }

            let result = builder
                .send()
                .await
                .map_err(|e| octocrab_error("create pull request", e))
                .map_err(|e| with_head_hint(e, &pr.head))?;

            Ok(PullRequest::from(result))
        })
    }

    fn update_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
        update: UpdatePullRequest,
    ) -> Result<PullRequest> {
        let octocrab = self.octocrab.clone();

        self.block_on(async move {
            let pulls = octocrab.pulls(&repo.owner, &repo.name);
            let mut builder = pulls
                .update(number)
                .title(&update.title)
                .body(&update.body)
                .base(&update.base);

            if let Some(allow) = update.maintainer_can_modify {
                builder = builder.maintainer_can_modify(allow);
            }

            let result = builder
                .send()
                .await
                .map_err(|e| octocrab_error("update pull request", e))?;

            Ok(PullRequest::from(result))
        })
    }
}

/// Keep the HTTP status of API failures; other octocrab errors carry only a message.
fn octocrab_error(action: &str, err: octocrab::Error) -> ForkPrError {
    match err {
        octocrab::Error::GitHub { source, .. } => ForkPrError::Api {
            status: source.status_code.as_u16(),
            message: source.message,
        },
        other => ForkPrError::GitHub {
            message: format!("Failed to {}: {}", action, other),
        },
    }
}

/// A 422 on creation usually means the head branch is not visible yet.
fn with_head_hint(err: ForkPrError, head: &str) -> ForkPrError {
    match err {
        ForkPrError::Api {
            status: 422,
            message,
        } => ForkPrError::Api {
            status: 422,
            message: format!("{} (head '{}' may not exist yet)", message, head),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_mentions_head() {
        let err = with_head_hint(
            ForkPrError::Api {
                status: 422,
                message: "Validation Failed".into(),
            },
            "octo:docs",
        );
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.to_string(),
            "GitHub API error (HTTP 422): Validation Failed (head 'octo:docs' may not exist yet)"
        );
    }

    #[test]
    fn test_other_failures_keep_their_status() {
        let err = with_head_hint(
            ForkPrError::Api {
                status: 403,
                message: "Resource not accessible by integration".into(),
            },
            "octo:docs",
        );
        assert_eq!(err.status(), Some(403));
        assert!(!err.to_string().contains("octo:docs"));
    }

    #[test]
    fn test_create_request_allows_maintainer_edits() {
        let create = CreatePullRequest::new("t", "b", "octo:docs", "main");
        assert_eq!(create.maintainer_can_modify, None);
        assert_eq!(create.maintainer_can_modify().maintainer_can_modify, Some(true));

        let update = UpdatePullRequest::new("t", "b", "main").maintainer_can_modify();
        assert_eq!(update.maintainer_can_modify, Some(true));
    }
}
