//! Identifiers shared by the GitHub client and the sync steps.

use crate::error::{ForkPrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository identifier (owner/name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/repo`, a github.com URL, or an SSH remote.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || ForkPrError::InvalidRepoSpec(spec.to_string());

        let trimmed = spec.trim();
        let path = trimmed
            .strip_prefix("git@github.com:")
            .or_else(|| trimmed.strip_prefix("https://github.com/"))
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
            .or_else(|| trimmed.strip_prefix("github.com/"))
            .unwrap_or(trimmed);
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(invalid()),
        }
    }
}

impl FromStr for RepoId {
    type Err = ForkPrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A git object id as returned by the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first seven characters for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Sha(s)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_owner_repo() {
        let repo = RepoId::parse("octocat/hello-world").unwrap();
        assert_eq!(repo, RepoId::new("octocat", "hello-world"));
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }

    #[test]
    fn test_parse_urls() {
        let expected = RepoId::new("octocat", "hello-world");
        for spec in [
            "https://github.com/octocat/hello-world",
            "https://github.com/octocat/hello-world.git",
            "http://github.com/octocat/hello-world/",
            "github.com/octocat/hello-world",
            "git@github.com:octocat/hello-world.git",
        ] {
            assert_eq!(RepoId::parse(spec).unwrap(), expected, "{}", spec);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for spec in ["", "octocat", "octocat/", "/repo", "a/b/c", "https://github.com/a"] {
            assert!(
                matches!(RepoId::parse(spec), Err(ForkPrError::InvalidRepoSpec(_))),
                "{}",
                spec
            );
        }
    }

    #[test]
    fn test_sha_short() {
        assert_eq!(Sha::new("0123456789abcdef").short(), "0123456");
        assert_eq!(Sha::new("abc").short(), "abc");
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(owner in "[A-Za-z0-9-]{1,20}", name in "[A-Za-z0-9._-]{1,30}") {
            prop_assume!(!name.ends_with(".git"));
            let repo = RepoId::new(owner, name);
            prop_assert_eq!(RepoId::parse(&repo.to_string()).unwrap(), repo);
        }
    }
}
