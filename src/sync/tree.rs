//! Change staging and commit creation.
//!
//! Every requested change is compared against the destination file on the
//! tip of the base repository's default branch. Only changes that would make
//! a difference end up in the tree of the new commit, and when none do no
//! commit is created at all.

use std::fs;

use crate::error::{ForkPrError, Result};
use crate::github::{GitCommit, GitDataOps, Lookup, TreeEntry};
use crate::sync::changes::{FileChange, FileOperation};
use crate::sync::CurrentContext;
use crate::types::RepoId;

/// What a staged path will hold in the new commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedContent {
    Write(Vec<u8>),
    Delete,
}

/// A path that differs from the base branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub path: String,
    pub content: StagedContent,
}

/// Why a change was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination already holds exactly these bytes.
    Unchanged,
    /// The path to delete does not exist on the base branch.
    Absent,
}

/// The result of comparing changes against the base branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Staged paths in the order they were first requested.
    pub entries: Vec<StagedEntry>,
    pub skipped: Vec<(String, SkipReason)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Record the outcome for `path`, replacing anything staged for it earlier.
    fn put(&mut self, path: &str, outcome: std::result::Result<StagedContent, SkipReason>) {
        let existing = self.entries.iter().position(|e| e.path == path);
        match (outcome, existing) {
            (Ok(content), Some(index)) => self.entries[index].content = content,
            (Ok(content), None) => self.entries.push(StagedEntry {
                path: path.to_string(),
                content,
            }),
            (Err(reason), existing) => {
                if let Some(index) = existing {
                    self.entries.remove(index);
                }
                self.skipped.push((path.to_string(), reason));
            }
        }
    }
}

/// Compare each change with the base branch tip and keep the ones that matter.
///
/// When several changes name the same destination, the last one wins.
pub fn stage_changes<C: GitDataOps + ?Sized>(
    client: &C,
    ctx: &CurrentContext,
    changes: &[FileChange],
) -> Result<ChangeSet> {
    let base = ctx.base();
    let mut set = ChangeSet::default();

    for change in changes {
        let path = change.destination.as_str();
        let current = client
            .get_file_contents(&base, path, ctx.tip())
            .map_err(ForkPrError::during("read destination file"))?;

        let outcome = match change.operation {
            FileOperation::Add => {
                let content = read_local(change)?;
                match current {
                    Lookup::Found(existing) if existing == content => Err(SkipReason::Unchanged),
                    _ => Ok(StagedContent::Write(content)),
                }
            }
            FileOperation::Remove => match current {
                Lookup::Found(_) => Ok(StagedContent::Delete),
                Lookup::NotFound => Err(SkipReason::Absent),
            },
        };

        match &outcome {
            Ok(StagedContent::Write(bytes)) => {
                tracing::debug!(path, bytes = bytes.len(), "Staged write")
            }
            Ok(StagedContent::Delete) => tracing::debug!(path, "Staged deletion"),
            Err(reason) => tracing::debug!(path, ?reason, "Skipping change"),
        }
        set.put(path, outcome);
    }

    tracing::info!(
        staged = set.len(),
        skipped = set.skipped.len(),
        "Compared changes with base branch"
    );
    Ok(set)
}

fn read_local(change: &FileChange) -> Result<Vec<u8>> {
    let path = change.local_path.as_ref().ok_or_else(|| {
        ForkPrError::InvalidConfig(format!(
            "no local file given for '{}'",
            change.destination
        ))
    })?;
    if !path.is_file() {
        return Err(ForkPrError::FileNotFound(path.clone()));
    }
    Ok(fs::read(path)?)
}

/// Write the staged changes into `repo` as one commit on top of the base tip.
///
/// Returns `None` without touching the server when nothing is staged.
pub fn commit_changes<C: GitDataOps + ?Sized>(
    client: &C,
    ctx: &CurrentContext,
    repo: &RepoId,
    set: &ChangeSet,
    message: &str,
) -> Result<Option<GitCommit>> {
    if set.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(set.len());
    for entry in &set.entries {
        let tree_entry = match &entry.content {
            StagedContent::Write(bytes) => {
                let sha = client
                    .create_blob(repo, bytes)
                    .map_err(ForkPrError::during("create blob"))?;
                TreeEntry::blob(&entry.path, sha)
            }
            StagedContent::Delete => TreeEntry::deletion(&entry.path),
        };
        entries.push(tree_entry);
    }

    let tree = client
        .create_tree(repo, &ctx.commit.tree.sha, &entries)
        .map_err(ForkPrError::during("create tree"))?;

    let commit = client
        .create_commit(repo, message, &tree.sha, std::slice::from_ref(ctx.tip()))
        .map_err(ForkPrError::during("create commit"))?;

    tracing::info!(
        repo = %repo,
        commit = %commit.sha.short(),
        files = entries.len(),
        "Created commit"
    );
    Ok(Some(commit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryGitHub;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup() -> (MemoryGitHub, CurrentContext, TempDir) {
        let gh = MemoryGitHub::new("octo");
        let base = RepoId::new("upstream", "project");
        gh.add_repo(
            &base,
            "main",
            &[("README.md", b"# Hello\n"), ("old.txt", b"stale\n")],
        );
        let ctx = CurrentContext::resolve(&gh, &base).unwrap();
        gh.clear_calls();
        (gh, ctx, TempDir::new().unwrap())
    }

    fn local(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_identical_content_is_skipped() {
        let (gh, ctx, dir) = setup();
        let same = local(dir.path(), "same.md", "# Hello\n");
        let changes = vec![FileChange::add(&same, "README.md").unwrap()];

        let set = stage_changes(&gh, &ctx, &changes).unwrap();
        assert!(set.is_empty());
        assert_eq!(
            set.skipped,
            vec![("README.md".to_string(), SkipReason::Unchanged)]
        );
    }

    #[test]
    fn test_new_and_changed_files_are_staged() {
        let (gh, ctx, dir) = setup();
        let changes = vec![
            FileChange::add(local(dir.path(), "a", "# Hello\n"), "dir2/README-2.md").unwrap(),
            FileChange::add(local(dir.path(), "b", "# Changed\n"), "README.md").unwrap(),
        ];

        let set = stage_changes(&gh, &ctx, &changes).unwrap();
        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["dir2/README-2.md", "README.md"]);
        assert_eq!(
            set.entries[1].content,
            StagedContent::Write(b"# Changed\n".to_vec())
        );
    }

    #[test]
    fn test_removing_missing_file_is_skipped() {
        let (gh, ctx, _dir) = setup();
        let changes = vec![
            FileChange::remove("nope.txt").unwrap(),
            FileChange::remove("old.txt").unwrap(),
        ];

        let set = stage_changes(&gh, &ctx, &changes).unwrap();
        assert_eq!(set.entries, vec![StagedEntry {
            path: "old.txt".into(),
            content: StagedContent::Delete,
        }]);
        assert_eq!(set.skipped, vec![("nope.txt".to_string(), SkipReason::Absent)]);
    }

    #[test]
    fn test_later_change_to_same_path_wins() {
        let (gh, ctx, dir) = setup();
        let changes = vec![
            FileChange::add(local(dir.path(), "a", "first\n"), "notes.txt").unwrap(),
            FileChange::add(local(dir.path(), "b", "second\n"), "notes.txt").unwrap(),
            FileChange::add(local(dir.path(), "c", "other\n"), "README.md").unwrap(),
            FileChange::add(local(dir.path(), "d", "# Hello\n"), "README.md").unwrap(),
        ];

        let set = stage_changes(&gh, &ctx, &changes).unwrap();
        assert_eq!(set.entries, vec![StagedEntry {
            path: "notes.txt".into(),
            content: StagedContent::Write(b"second\n".to_vec()),
        }]);
    }

    #[test]
    fn test_missing_local_file() {
        let (gh, ctx, dir) = setup();
        let missing = dir.path().join("missing.md");
        let changes = vec![FileChange::add(&missing, "README.md").unwrap()];

        let err = stage_changes(&gh, &ctx, &changes).unwrap_err();
        assert!(matches!(err, ForkPrError::FileNotFound(p) if p == missing));
    }

    #[test]
    fn test_read_failure_names_the_step() {
        let (gh, ctx, _dir) = setup();
        gh.fail_on("get_file_contents", 502);
        let err = stage_changes(&gh, &ctx, &[FileChange::remove("old.txt").unwrap()]).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read destination file"));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_empty_set_commits_nothing() {
        let (gh, ctx, _dir) = setup();
        let commit = commit_changes(&gh, &ctx, &ctx.base(), &ChangeSet::default(), "msg").unwrap();
        assert!(commit.is_none());
        assert!(gh.calls().is_empty());
    }

    #[test]
    fn test_commit_builds_on_base_tip() {
        let (gh, ctx, dir) = setup();
        let changes = vec![
            FileChange::add(local(dir.path(), "a", "new\n"), "docs/new.md").unwrap(),
            FileChange::remove("old.txt").unwrap(),
        ];
        let set = stage_changes(&gh, &ctx, &changes).unwrap();
        gh.clear_calls();

        let commit = commit_changes(&gh, &ctx, &ctx.base(), &set, "Update docs")
            .unwrap()
            .unwrap();
        assert_eq!(commit.message, "Update docs");
        assert_eq!(commit.parents.len(), 1);
        assert_eq!(&commit.parents[0].sha, ctx.tip());
        assert_eq!(gh.file_at(&commit.sha, "docs/new.md"), Some(b"new\n".to_vec()));
        assert_eq!(gh.file_at(&commit.sha, "old.txt"), None);
        assert_eq!(gh.file_at(&commit.sha, "README.md"), Some(b"# Hello\n".to_vec()));
        assert_eq!(
            gh.call_names(),
            vec!["create_blob", "create_tree", "create_commit"]
        );
    }
}
