//! Git data operations: refs, commits, trees, blobs and file contents.
//!
//! These map onto GitHub's low-level Git database API. Object storage and
//! hashing happen server-side; this module only shapes the requests.

use crate::error::{ForkPrError, Result};
use crate::github::{GitHubClient, Lookup};
use crate::types::{RepoId, Sha};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Mode for a regular, non-executable file.
pub const FILE_MODE: &str = "100644";

/// The object a ref points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: Sha,
    #[serde(rename = "type", default = "default_object_kind")]
    pub kind: String,
}

fn default_object_kind() -> String {
    "commit".to_string()
}

/// A named ref such as `refs/heads/main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// A bare pointer to another git object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub sha: Sha,
}

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    pub sha: Sha,
    #[serde(default)]
    pub message: String,
    pub tree: ObjectRef,
    #[serde(default)]
    pub parents: Vec<ObjectRef>,
}

/// One item of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitTreeItem {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: Option<Sha>,
}

/// A tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitTree {
    pub sha: Sha,
    #[serde(default)]
    pub tree: Vec<GitTreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

/// An entry submitted when creating a tree.
///
/// A `None` sha is serialized as an explicit `null`, which removes the path
/// from the base tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: Option<Sha>,
}

impl TreeEntry {
    /// A regular file pointing at an existing blob.
    pub fn blob(path: impl Into<String>, sha: Sha) -> Self {
        Self {
            path: path.into(),
            mode: FILE_MODE,
            kind: "blob",
            sha: Some(sha),
        }
    }

    /// A deletion of `path` from the base tree.
    pub fn deletion(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: FILE_MODE,
            kind: "blob",
            sha: None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        self.sha.is_none()
    }
}

/// Git database operations scoped by repository.
pub trait GitDataOps {
    /// Get the ref for a branch.
    fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<GitRef>;

    /// List refs whose name starts with `refs/heads/<branch>`.
    ///
    /// This is a prefix match: asking for `feature` also returns
    /// `feature-2`. A repository with no matching refs yields an empty list.
    fn list_matching_refs(&self, repo: &RepoId, branch: &str) -> Result<Vec<GitRef>>;

    /// Create `refs/heads/<branch>` pointing at `sha`.
    fn create_ref(&self, repo: &RepoId, branch: &str, sha: &Sha) -> Result<GitRef>;

    /// Move `refs/heads/<branch>` to `sha`; `force` allows non-fast-forward moves.
    fn update_ref(&self, repo: &RepoId, branch: &str, sha: &Sha, force: bool) -> Result<GitRef>;

    /// Get a commit object.
    fn get_commit(&self, repo: &RepoId, sha: &Sha) -> Result<GitCommit>;

    /// Get a tree object (non-recursive).
    fn get_tree(&self, repo: &RepoId, sha: &Sha) -> Result<GitTree>;

    /// Read the bytes of a file at a given commit.
    fn get_file_contents(&self, repo: &RepoId, path: &str, at: &Sha)
    -> Result<Lookup<Vec<u8>>>;

    /// Store `content` as a blob and return its sha.
    fn create_blob(&self, repo: &RepoId, content: &[u8]) -> Result<Sha>;

    /// Create a tree from `entries` layered over `base_tree`.
    fn create_tree(&self, repo: &RepoId, base_tree: &Sha, entries: &[TreeEntry])
    -> Result<GitTree>;

    /// Create a commit object.
    fn create_commit(
        &self,
        repo: &RepoId,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<GitCommit>;
}

/// Percent-encode each segment of a slash-separated path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl GitDataOps for GitHubClient {
    fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<GitRef> {
        let endpoint = format!(
            "/repos/{}/{}/git/ref/heads/{}",
            repo.owner,
            repo.name,
            encode_path(branch)
        );
        self.get(&endpoint)
    }

    fn list_matching_refs(&self, repo: &RepoId, branch: &str) -> Result<Vec<GitRef>> {
        let endpoint = format!(
            "/repos/{}/{}/git/matching-refs/heads/{}",
            repo.owner,
            repo.name,
            encode_path(branch)
        );
        Ok(self.lookup(&endpoint)?.found().unwrap_or_default())
    }

    fn create_ref(&self, repo: &RepoId, branch: &str, sha: &Sha) -> Result<GitRef> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(rename = "ref")]
            name: String,
            sha: &'a Sha,
        }

        let endpoint = format!("/repos/{}/{}/git/refs", repo.owner, repo.name);
        self.post(
            &endpoint,
            &Body {
                name: format!("refs/heads/{}", branch),
                sha,
            },
        )
    }

    fn update_ref(&self, repo: &RepoId, branch: &str, sha: &Sha, force: bool) -> Result<GitRef> {
        #[derive(Serialize)]
        struct Body<'a> {
            sha: &'a Sha,
            force: bool,
        }

        let endpoint = format!(
            "/repos/{}/{}/git/refs/heads/{}",
            repo.owner,
            repo.name,
            encode_path(branch)
        );
        self.patch(&endpoint, &Body { sha, force })
    }

    fn get_commit(&self, repo: &RepoId, sha: &Sha) -> Result<GitCommit> {
        let endpoint = format!("/repos/{}/{}/git/commits/{}", repo.owner, repo.name, sha);
        self.get(&endpoint)
    }

    fn get_tree(&self, repo: &RepoId, sha: &Sha) -> Result<GitTree> {
        let endpoint = format!("/repos/{}/{}/git/trees/{}", repo.owner, repo.name, sha);
        self.get(&endpoint)
    }

    fn get_file_contents(
        &self,
        repo: &RepoId,
        path: &str,
        at: &Sha,
    ) -> Result<Lookup<Vec<u8>>> {
        if path.is_empty() {
            return Err(ForkPrError::InvalidConfig(
                "Destination path must not be empty".into(),
            ));
        }
        let endpoint = format!(
            "/repos/{}/{}/contents/{}?ref={}",
            repo.owner,
            repo.name,
            encode_path(path),
            at
        );
        self.lookup_raw(&endpoint)
    }

    fn create_blob(&self, repo: &RepoId, content: &[u8]) -> Result<Sha> {
        #[derive(Serialize)]
        struct Body {
            content: String,
            encoding: &'static str,
        }

        let endpoint = format!("/repos/{}/{}/git/blobs", repo.owner, repo.name);
        let created: ObjectRef = self.post(
            &endpoint,
            &Body {
                content: BASE64.encode(content),
                encoding: "base64",
            },
        )?;
        Ok(created.sha)
    }

    fn create_tree(
        &self,
        repo: &RepoId,
        base_tree: &Sha,
        entries: &[TreeEntry],
    ) -> Result<GitTree> {
        #[derive(Serialize)]
        struct Body<'a> {
            base_tree: &'a Sha,
            tree: &'a [TreeEntry],
        }

        let endpoint = format!("/repos/{}/{}/git/trees", repo.owner, repo.name);
        self.post(
            &endpoint,
            &Body {
                base_tree,
                tree: entries,
            },
        )
    }

    fn create_commit(
        &self,
        repo: &RepoId,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<GitCommit> {
        #[derive(Serialize)]
        struct Body<'a> {
            message: &'a str,
            tree: &'a Sha,
            parents: &'a [Sha],
        }

        let endpoint = format!("/repos/{}/{}/git/commits", repo.owner, repo.name);
        self.post(
            &endpoint,
            &Body {
                message,
                tree,
                parents,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_serializes_null_sha() {
        let json = serde_json::to_value(TreeEntry::deletion("docs/old.md")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": "docs/old.md",
                "mode": "100644",
                "type": "blob",
                "sha": null
            })
        );
    }

    #[test]
    fn test_blob_entry_serializes_sha() {
        let entry = TreeEntry::blob("dir2/README-2.md", Sha::new("abc123"));
        assert!(!entry.is_deletion());
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["sha"], "abc123");
        assert_eq!(json["type"], "blob");
    }

    #[test]
    fn test_ref_deserializes_api_shape() {
        let json = r#"{
            "ref": "refs/heads/main",
            "node_id": "MDM6UmVmcmVmcy9oZWFkcy9mZWF0dXJlQQ==",
            "url": "https://api.github.com/repos/octocat/Hello-World/git/refs/heads/main",
            "object": {"type": "commit", "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd"}
        }"#;
        let git_ref: GitRef = serde_json::from_str(json).unwrap();
        assert_eq!(git_ref.name, "refs/heads/main");
        assert_eq!(git_ref.object.kind, "commit");
    }

    #[test]
    fn test_commit_deserializes_api_shape() {
        let json = r#"{
            "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
            "message": "added readme",
            "tree": {"sha": "691272480426f78a0138979dd3ce63b77f706feb", "url": "x"},
            "parents": [{"sha": "1acc419d4d6a9ce985db7be48c6349a0475975b5", "url": "y"}]
        }"#;
        let commit: GitCommit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.tree.sha.short(), "6912724");
        assert_eq!(commit.parents.len(), 1);
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("dir 2/README #2.md"), "dir%202/README%20%232.md");
        assert_eq!(encode_path("feature/login"), "feature/login");
    }
}
