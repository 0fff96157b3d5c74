//! Error types for fork-pr.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fork and pull request operations.
#[derive(Error, Debug)]
pub enum ForkPrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GitHub API error: {message}")]
    GitHub { message: String },

    #[error("{var} must be provided as an environment variable")]
    MissingToken { var: String },

    #[error("Invalid repository '{0}': expected owner/repo")]
    InvalidRepoSpec(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Local file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Multiple open pull requests match head '{head}': {}", pr_list(.numbers))]
    DuplicatePullRequests { head: String, numbers: Vec<u64> },

    #[error("Failed to {step}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<ForkPrError>,
    },
}

impl ForkPrError {
    /// Wrap an error with the name of the step that produced it.
    pub fn during(step: &'static str) -> impl FnOnce(ForkPrError) -> ForkPrError {
        move |source| ForkPrError::Step {
            step,
            source: Box::new(source),
        }
    }

    /// The HTTP status of the underlying API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForkPrError::Api { status, .. } => Some(*status),
            ForkPrError::Step { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether this error (or the error it wraps) is a missing credential.
    pub fn is_missing_token(&self) -> bool {
        match self {
            ForkPrError::MissingToken { .. } => true,
            ForkPrError::Step { source, .. } => source.is_missing_token(),
            _ => false,
        }
    }
}

fn pr_list(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| format!("#{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized Result type for fork-pr operations.
pub type Result<T> = std::result::Result<T, ForkPrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_context_in_message() {
        let err = ForkPrError::during("get base repo")(ForkPrError::Api {
            status: 403,
            message: "Forbidden".into(),
        });
        assert_eq!(err.to_string(), "Failed to get base repo");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_step_chain_names_each_cause_once() {
        let err = ForkPrError::during("update branch")(ForkPrError::Api {
            status: 422,
            message: "Update is not a fast forward".into(),
        });
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "Failed to update branch: GitHub API error (HTTP 422): Update is not a fast forward"
        );
    }

    #[test]
    fn test_duplicate_pull_requests_message() {
        let err = ForkPrError::DuplicatePullRequests {
            head: "octo:feature".into(),
            numbers: vec![4, 9],
        };
        assert_eq!(
            err.to_string(),
            "Multiple open pull requests match head 'octo:feature': #4, #9"
        );
    }

    #[test]
    fn test_missing_token_detected_through_step() {
        let err = ForkPrError::during("authenticate")(ForkPrError::MissingToken {
            var: "GITHUB_TOKEN".into(),
        });
        assert!(err.is_missing_token());
        assert!(!ForkPrError::InvalidConfig("x".into()).is_missing_token());
    }
}
