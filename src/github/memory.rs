//! In-memory stand-in for the GitHub API.
//!
//! `MemoryGitHub` implements the same operation traits as `GitHubClient`,
//! keeping repositories, refs, git objects and pull requests in process. It
//! records every call so callers can assert which requests a workflow issued,
//! and can be told to fail a named operation with a given HTTP status.
//!
//! Git objects live in one shared store, the way forks share object storage
//! on GitHub. Trees are flat maps from full path to blob.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{ForkPrError, Result};
use crate::github::git_data::{
    FILE_MODE, GitCommit, GitDataOps, GitObject, GitRef, GitTree, GitTreeItem, ObjectRef,
    TreeEntry,
};
use crate::github::pr::{
    CreatePullRequest, PullRequest, PullRequestOps, PullRequestRef, UpdatePullRequest,
};
use crate::github::repos::{GitHubRepo, GitHubUser, RepoOps};
use crate::github::Lookup;
use crate::types::{RepoId, Sha};

/// A request issued against `MemoryGitHub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AuthenticatedUser,
    GetRepo(RepoId),
    CreateFork(RepoId),
    GetRef { repo: RepoId, branch: String },
    ListMatchingRefs { repo: RepoId, branch: String },
    CreateRef { repo: RepoId, branch: String, sha: Sha },
    UpdateRef { repo: RepoId, branch: String, sha: Sha, force: bool },
    GetCommit { repo: RepoId, sha: Sha },
    GetTree { repo: RepoId, sha: Sha },
    GetFileContents { repo: RepoId, path: String },
    CreateBlob { repo: RepoId },
    CreateTree { repo: RepoId, entries: usize },
    CreateCommit { repo: RepoId, message: String },
    ListPullRequests { repo: RepoId, head: String },
    CreatePullRequest { repo: RepoId, head: String },
    UpdatePullRequest { repo: RepoId, number: u64 },
}

impl Call {
    /// The operation name, matching the trait method name.
    pub fn name(&self) -> &'static str {
        match self {
            Call::AuthenticatedUser => "authenticated_user",
            Call::GetRepo(_) => "get_repo",
            Call::CreateFork(_) => "create_fork",
            Call::GetRef { .. } => "get_ref",
            Call::ListMatchingRefs { .. } => "list_matching_refs",
            Call::CreateRef { .. } => "create_ref",
            Call::UpdateRef { .. } => "update_ref",
            Call::GetCommit { .. } => "get_commit",
            Call::GetTree { .. } => "get_tree",
            Call::GetFileContents { .. } => "get_file_contents",
            Call::CreateBlob { .. } => "create_blob",
            Call::CreateTree { .. } => "create_tree",
            Call::CreateCommit { .. } => "create_commit",
            Call::ListPullRequests { .. } => "list_pull_requests",
            Call::CreatePullRequest { .. } => "create_pull_request",
            Call::UpdatePullRequest { .. } => "update_pull_request",
        }
    }

    /// Whether the call changes state on the server.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateFork(_)
                | Call::CreateRef { .. }
                | Call::UpdateRef { .. }
                | Call::CreateBlob { .. }
                | Call::CreateTree { .. }
                | Call::CreateCommit { .. }
                | Call::CreatePullRequest { .. }
                | Call::UpdatePullRequest { .. }
        )
    }
}

/// A pull request as stored by `MemoryGitHub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRecord {
    pub repo: RepoId,
    pub pull: PullRequest,
    pub open: bool,
    pub maintainer_can_modify: bool,
}

#[derive(Debug, Clone)]
struct CommitData {
    tree: Sha,
    parents: Vec<Sha>,
    message: String,
}

#[derive(Debug, Clone)]
struct RepoState {
    default_branch: String,
    refs: BTreeMap<String, Sha>,
    fork: bool,
}

#[derive(Debug, Default)]
struct State {
    user: String,
    repos: BTreeMap<String, (RepoId, RepoState)>,
    blobs: HashMap<Sha, Vec<u8>>,
    trees: HashMap<Sha, BTreeMap<String, Sha>>,
    commits: HashMap<Sha, CommitData>,
    pulls: Vec<PullRecord>,
    calls: Vec<Call>,
    failures: HashMap<&'static str, u16>,
    next_object: u64,
    next_pull: u64,
}

impl State {
    fn new_sha(&mut self) -> Sha {
        self.next_object += 1;
        Sha::new(format!("{:040x}", self.next_object))
    }

    fn repo(&self, repo: &RepoId) -> Result<&RepoState> {
        self.repos
            .get(&repo.to_string())
            .map(|(_, state)| state)
            .ok_or_else(not_found)
    }

    fn repo_mut(&mut self, repo: &RepoId) -> Result<&mut RepoState> {
        self.repos
            .get_mut(&repo.to_string())
            .map(|(_, state)| state)
            .ok_or_else(not_found)
    }

    fn store_blob(&mut self, content: &[u8]) -> Sha {
        let sha = self.new_sha();
        self.blobs.insert(sha.clone(), content.to_vec());
        sha
    }

    fn store_tree(&mut self, files: BTreeMap<String, Sha>) -> Sha {
        let sha = self.new_sha();
        self.trees.insert(sha.clone(), files);
        sha
    }

    fn store_commit(&mut self, data: CommitData) -> Sha {
        let sha = self.new_sha();
        self.commits.insert(sha.clone(), data);
        sha
    }

    fn tree_files(&self, commit: &Sha) -> Option<&BTreeMap<String, Sha>> {
        let data = self.commits.get(commit)?;
        self.trees.get(&data.tree)
    }

    fn is_ancestor(&self, ancestor: &Sha, descendant: &Sha) -> bool {
        let mut pending = vec![descendant.clone()];
        let mut seen = HashSet::new();
        while let Some(sha) = pending.pop() {
            if &sha == ancestor {
                return true;
            }
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(data) = self.commits.get(&sha) {
                pending.extend(data.parents.iter().cloned());
            }
        }
        false
    }

    fn git_commit(&self, sha: &Sha) -> Result<GitCommit> {
        let data = self.commits.get(sha).ok_or_else(not_found)?;
        Ok(GitCommit {
            sha: sha.clone(),
            message: data.message.clone(),
            tree: ObjectRef {
                sha: data.tree.clone(),
            },
            parents: data
                .parents
                .iter()
                .map(|p| ObjectRef { sha: p.clone() })
                .collect(),
        })
    }
}

fn not_found() -> ForkPrError {
    ForkPrError::Api {
        status: 404,
        message: "Not Found".into(),
    }
}

fn unprocessable(message: &str) -> ForkPrError {
    ForkPrError::Api {
        status: 422,
        message: message.into(),
    }
}

fn git_ref(branch: &str, sha: &Sha) -> GitRef {
    GitRef {
        name: format!("refs/heads/{}", branch),
        object: GitObject {
            sha: sha.clone(),
            kind: "commit".into(),
        },
    }
}

/// An in-process GitHub with one authenticated user.
#[derive(Debug)]
pub struct MemoryGitHub {
    state: RefCell<State>,
}

impl MemoryGitHub {
    /// Create an empty server where the token belongs to `user`.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(State {
                user: user.into(),
                ..State::default()
            }),
        }
    }

    /// Create a repository whose default branch holds a single commit with `files`.
    ///
    /// Returns the sha of that commit.
    pub fn add_repo(&self, repo: &RepoId, default_branch: &str, files: &[(&str, &[u8])]) -> Sha {
        let mut state = self.state.borrow_mut();
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            let blob = state.store_blob(content);
            tree.insert(path.to_string(), blob);
        }
        let tree = state.store_tree(tree);
        let commit = state.store_commit(CommitData {
            tree,
            parents: Vec::new(),
            message: "Initial commit".into(),
        });

        let mut refs = BTreeMap::new();
        refs.insert(default_branch.to_string(), commit.clone());
        state.repos.insert(
            repo.to_string(),
            (
                repo.clone(),
                RepoState {
                    default_branch: default_branch.to_string(),
                    refs,
                    fork: false,
                },
            ),
        );
        commit
    }

    /// Commit `files` (a `None` content deletes the path) on top of `branch`.
    ///
    /// Returns the new tip. Used to move a base branch forward, e.g. after a
    /// pull request was merged.
    pub fn push_files(
        &self,
        repo: &RepoId,
        branch: &str,
        files: &[(&str, Option<&[u8]>)],
    ) -> Result<Sha> {
        let mut state = self.state.borrow_mut();
        let parent = state
            .repo(repo)?
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(not_found)?;
        let mut tree = state.tree_files(&parent).cloned().unwrap_or_default();
        for (path, content) in files {
            match content {
                Some(bytes) => {
                    let blob = state.store_blob(bytes);
                    tree.insert(path.to_string(), blob);
                }
                None => {
                    tree.remove(*path);
                }
            }
        }
        let tree = state.store_tree(tree);
        let commit = state.store_commit(CommitData {
            tree,
            parents: vec![parent],
            message: "Update files".into(),
        });
        state
            .repo_mut(repo)?
            .refs
            .insert(branch.to_string(), commit.clone());
        Ok(commit)
    }

    /// Create a bare branch pointing at `sha`.
    pub fn add_branch(&self, repo: &RepoId, branch: &str, sha: &Sha) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state
            .repo_mut(repo)?
            .refs
            .insert(branch.to_string(), sha.clone());
        Ok(())
    }

    /// Seed an open pull request from `head` (`owner:branch`).
    pub fn add_pull(&self, repo: &RepoId, head: &str, title: &str) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_pull += 1;
        let number = state.next_pull;
        let pull = memory_pull(repo, number, head, title, "", "main");
        state.pulls.push(PullRecord {
            repo: repo.clone(),
            pull,
            open: true,
            maintainer_can_modify: false,
        });
        number
    }

    /// Make every later call of operation `name` fail with `status`.
    pub fn fail_on(&self, name: &'static str, status: u16) {
        self.state.borrow_mut().failures.insert(name, status);
    }

    /// The sha a branch points at.
    pub fn branch_sha(&self, repo: &RepoId, branch: &str) -> Option<Sha> {
        let state = self.state.borrow();
        state.repo(repo).ok()?.refs.get(branch).cloned()
    }

    /// All branch names of a repository.
    pub fn branches(&self, repo: &RepoId) -> Vec<String> {
        let state = self.state.borrow();
        state
            .repo(repo)
            .map(|r| r.refs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Contents of `path` in the tree of `commit`.
    pub fn file_at(&self, commit: &Sha, path: &str) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        let blob = state.tree_files(commit)?.get(path)?;
        state.blobs.get(blob).cloned()
    }

    /// Look up a commit object.
    pub fn commit(&self, sha: &Sha) -> Option<GitCommit> {
        self.state.borrow().git_commit(sha).ok()
    }

    /// Whether a repository exists.
    pub fn has_repo(&self, repo: &RepoId) -> bool {
        self.state.borrow().repo(repo).is_ok()
    }

    /// All pull requests, open or not.
    pub fn pulls(&self) -> Vec<PullRecord> {
        self.state.borrow().pulls.clone()
    }

    /// Every call issued so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Names of the calls issued so far, oldest first.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(Call::name).collect()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let failure = state.failures.get(call.name()).copied();
        state.calls.push(call);
        match failure {
            Some(status) => Err(ForkPrError::Api {
                status,
                message: "injected failure".into(),
            }),
            None => Ok(()),
        }
    }
}

fn memory_pull(
    repo: &RepoId,
    number: u64,
    head: &str,
    title: &str,
    body: &str,
    base: &str,
) -> PullRequest {
    let head_branch = head.split_once(':').map(|(_, b)| b).unwrap_or(head);
    PullRequest {
        number,
        html_url: format!("https://github.com/{}/pull/{}", repo, number),
        state: "open".into(),
        title: title.into(),
        body: Some(body.into()),
        head: PullRequestRef {
            label: Some(head.into()),
            ref_name: head_branch.into(),
            sha: String::new(),
        },
        base: PullRequestRef {
            label: Some(format!("{}:{}", repo.owner, base)),
            ref_name: base.into(),
            sha: String::new(),
        },
    }
}

impl RepoOps for MemoryGitHub {
    fn authenticated_user(&self) -> Result<GitHubUser> {
        self.record(Call::AuthenticatedUser)?;
        Ok(GitHubUser {
            login: self.state.borrow().user.clone(),
        })
    }

    fn get_repo(&self, repo: &RepoId) -> Result<Lookup<GitHubRepo>> {
        self.record(Call::GetRepo(repo.clone()))?;
        let state = self.state.borrow();
        Ok(state
            .repos
            .get(&repo.to_string())
            .map(|(id, s)| memory_repo(id, s))
            .into())
    }

    fn create_fork(&self, repo: &RepoId) -> Result<GitHubRepo> {
        self.record(Call::CreateFork(repo.clone()))?;
        let mut state = self.state.borrow_mut();
        let source = state.repo(repo)?.clone();
        let fork_id = RepoId::new(state.user.clone(), repo.name.clone());

        if let Some((id, existing)) = state.repos.get(&fork_id.to_string()) {
            return Ok(memory_repo(id, existing));
        }

        let mut refs = BTreeMap::new();
        if let Some(tip) = source.refs.get(&source.default_branch) {
            refs.insert(source.default_branch.clone(), tip.clone());
        }
        let fork = RepoState {
            default_branch: source.default_branch.clone(),
            refs,
            fork: true,
        };
        let created = memory_repo(&fork_id, &fork);
        state.repos.insert(fork_id.to_string(), (fork_id, fork));
        Ok(created)
    }
}

fn memory_repo(id: &RepoId, state: &RepoState) -> GitHubRepo {
    GitHubRepo {
        name: id.name.clone(),
        full_name: id.to_string(),
        owner: GitHubUser {
            login: id.owner.clone(),
        },
        default_branch: state.default_branch.clone(),
        fork: state.fork,
        html_url: Some(format!("https://github.com/{}", id)),
    }
}

impl GitDataOps for MemoryGitHub {
    fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<GitRef> {
        self.record(Call::GetRef {
            repo: repo.clone(),
            branch: branch.into(),
        })?;
        let state = self.state.borrow();
        let sha = state.repo(repo)?.refs.get(branch).ok_or_else(not_found)?;
        Ok(git_ref(branch, sha))
    }

    fn list_matching_refs(&self, repo: &RepoId, branch: &str) -> Result<Vec<GitRef>> {
        self.record(Call::ListMatchingRefs {
            repo: repo.clone(),
            branch: branch.into(),
        })?;
        let state = self.state.borrow();
        Ok(state
            .repo(repo)?
            .refs
            .iter()
            .filter(|(name, _)| name.starts_with(branch))
            .map(|(name, sha)| git_ref(name, sha))
            .collect())
    }

    fn create_ref(&self, repo: &RepoId, branch: &str, sha: &Sha) -> Result<GitRef> {
        self.record(Call::CreateRef {
            repo: repo.clone(),
            branch: branch.into(),
            sha: sha.clone(),
        })?;
        let mut state = self.state.borrow_mut();
        if !state.commits.contains_key(sha) {
            return Err(unprocessable("Object does not exist"));
        }
        let refs = &mut state.repo_mut(repo)?.refs;
        if refs.contains_key(branch) {
            return Err(unprocessable("Reference already exists"));
        }
        refs.insert(branch.to_string(), sha.clone());
        Ok(git_ref(branch, sha))
    }

    fn update_ref(&self, repo: &RepoId, branch: &str, sha: &Sha, force: bool) -> Result<GitRef> {
        self.record(Call::UpdateRef {
            repo: repo.clone(),
            branch: branch.into(),
            sha: sha.clone(),
            force,
        })?;
        let mut state = self.state.borrow_mut();
        let current = state
            .repo(repo)?
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| unprocessable("Reference does not exist"))?;
        if !force && !state.is_ancestor(&current, sha) {
            return Err(unprocessable("Update is not a fast forward"));
        }
        state
            .repo_mut(repo)?
            .refs
            .insert(branch.to_string(), sha.clone());
        Ok(git_ref(branch, sha))
    }

    fn get_commit(&self, repo: &RepoId, sha: &Sha) -> Result<GitCommit> {
        self.record(Call::GetCommit {
            repo: repo.clone(),
            sha: sha.clone(),
        })?;
        let state = self.state.borrow();
        state.repo(repo)?;
        state.git_commit(sha)
    }

    fn get_tree(&self, repo: &RepoId, sha: &Sha) -> Result<GitTree> {
        self.record(Call::GetTree {
            repo: repo.clone(),
            sha: sha.clone(),
        })?;
        let state = self.state.borrow();
        state.repo(repo)?;
        let files = state.trees.get(sha).ok_or_else(not_found)?;
        Ok(GitTree {
            sha: sha.clone(),
            tree: files
                .iter()
                .map(|(path, blob)| GitTreeItem {
                    path: path.clone(),
                    mode: FILE_MODE.into(),
                    kind: "blob".into(),
                    sha: Some(blob.clone()),
                })
                .collect(),
            truncated: false,
        })
    }

    fn get_file_contents(
        &self,
        repo: &RepoId,
        path: &str,
        at: &Sha,
    ) -> Result<Lookup<Vec<u8>>> {
        self.record(Call::GetFileContents {
            repo: repo.clone(),
            path: path.into(),
        })?;
        let state = self.state.borrow();
        if state.repo(repo).is_err() {
            return Ok(Lookup::NotFound);
        }
        let content = state
            .tree_files(at)
            .and_then(|files| files.get(path))
            .and_then(|blob| state.blobs.get(blob))
            .cloned();
        Ok(content.into())
    }

    fn create_blob(&self, repo: &RepoId, content: &[u8]) -> Result<Sha> {
        self.record(Call::CreateBlob { repo: repo.clone() })?;
        let mut state = self.state.borrow_mut();
        state.repo(repo)?;
        Ok(state.store_blob(content))
    }

    fn create_tree(
        &self,
        repo: &RepoId,
        base_tree: &Sha,
        entries: &[TreeEntry],
    ) -> Result<GitTree> {
        self.record(Call::CreateTree {
            repo: repo.clone(),
            entries: entries.len(),
        })?;
        let mut state = self.state.borrow_mut();
        state.repo(repo)?;
        let mut files = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| unprocessable("base_tree is not a valid tree"))?;
        for entry in entries {
            match &entry.sha {
                Some(blob) => {
                    if !state.blobs.contains_key(blob) {
                        return Err(unprocessable("tree.sha is not a valid blob"));
                    }
                    files.insert(entry.path.clone(), blob.clone());
                }
                None => {
                    if files.remove(&entry.path).is_none() {
                        return Err(unprocessable("tree.path does not exist in base_tree"));
                    }
                }
            }
        }
        let sha = state.store_tree(files);
        Ok(GitTree {
            sha,
            tree: Vec::new(),
            truncated: false,
        })
    }

    fn create_commit(
        &self,
        repo: &RepoId,
        message: &str,
        tree: &Sha,
        parents: &[Sha],
    ) -> Result<GitCommit> {
        self.record(Call::CreateCommit {
            repo: repo.clone(),
            message: message.into(),
        })?;
        let mut state = self.state.borrow_mut();
        state.repo(repo)?;
        if !state.trees.contains_key(tree) {
            return Err(unprocessable("Tree SHA does not exist"));
        }
        let sha = state.store_commit(CommitData {
            tree: tree.clone(),
            parents: parents.to_vec(),
            message: message.into(),
        });
        state.git_commit(&sha)
    }
}

impl PullRequestOps for MemoryGitHub {
    fn list_pull_requests(&self, repo: &RepoId, head: &str) -> Result<Vec<PullRequest>> {
        self.record(Call::ListPullRequests {
            repo: repo.clone(),
            head: head.into(),
        })?;
        let state = self.state.borrow();
        Ok(state
            .pulls
            .iter()
            .filter(|p| p.open && &p.repo == repo && p.pull.head.label.as_deref() == Some(head))
            .map(|p| p.pull.clone())
            .collect())
    }

    fn create_pull_request(&self, repo: &RepoId, pr: CreatePullRequest) -> Result<PullRequest> {
        self.record(Call::CreatePullRequest {
            repo: repo.clone(),
            head: pr.head.clone(),
        })?;
        let mut state = self.state.borrow_mut();
        let (owner, branch) = pr
            .head
            .split_once(':')
            .ok_or_else(|| unprocessable("head must be owner:branch"))?;
        let head_repo = RepoId::new(owner, repo.name.clone());
        if !state.repo(&head_repo)?.refs.contains_key(branch) {
            return Err(unprocessable("Validation Failed: head does not exist"));
        }
        state.next_pull += 1;
        let number = state.next_pull;
        let pull = memory_pull(repo, number, &pr.head, &pr.title, &pr.body, &pr.base);
        state.pulls.push(PullRecord {
            repo: repo.clone(),
            pull: pull.clone(),
            open: true,
            maintainer_can_modify: pr.maintainer_can_modify.unwrap_or(false),
        });
        Ok(pull)
    }

    fn update_pull_request(
        &self,
        repo: &RepoId,
        number: u64,
        update: UpdatePullRequest,
    ) -> Result<PullRequest> {
        self.record(Call::UpdatePullRequest {
            repo: repo.clone(),
            number,
        })?;
        let mut state = self.state.borrow_mut();
        let record = state
            .pulls
            .iter_mut()
            .find(|p| &p.repo == repo && p.pull.number == number)
            .ok_or_else(not_found)?;
        record.pull.title = update.title;
        record.pull.body = Some(update.body);
        record.pull.base.ref_name = update.base;
        if let Some(allow) = update.maintainer_can_modify {
            record.maintainer_can_modify = allow;
        }
        Ok(record.pull.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RepoId {
        RepoId::new("upstream", "project")
    }

    #[test]
    fn test_matching_refs_are_prefix_matches() {
        let gh = MemoryGitHub::new("octo");
        let tip = gh.add_repo(&base(), "main", &[]);
        gh.add_branch(&base(), "feature", &tip).unwrap();
        gh.add_branch(&base(), "feature-2", &tip).unwrap();

        let refs = gh.list_matching_refs(&base(), "feature").unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["refs/heads/feature", "refs/heads/feature-2"]);
    }

    #[test]
    fn test_soft_update_rejects_non_fast_forward() {
        let gh = MemoryGitHub::new("octo");
        let root = gh.add_repo(&base(), "main", &[("a.txt", b"a")]);
        let ahead = gh.push_files(&base(), "main", &[("b.txt", Some(&b"b"[..]))]).unwrap();

        let err = gh.update_ref(&base(), "main", &root, false).unwrap_err();
        assert_eq!(err.status(), Some(422));

        gh.update_ref(&base(), "main", &root, true).unwrap();
        assert_eq!(gh.branch_sha(&base(), "main"), Some(root.clone()));
        gh.update_ref(&base(), "main", &ahead, false).unwrap();
        assert_eq!(gh.branch_sha(&base(), "main"), Some(ahead));
    }

    #[test]
    fn test_fork_copies_default_branch() {
        let gh = MemoryGitHub::new("octo");
        let tip = gh.add_repo(&base(), "main", &[]);
        let fork = gh.create_fork(&base()).unwrap();
        assert!(fork.fork);
        assert_eq!(fork.id(), RepoId::new("octo", "project"));
        assert_eq!(gh.branch_sha(&fork.id(), "main"), Some(tip));
    }

    #[test]
    fn test_injected_failure_is_recorded() {
        let gh = MemoryGitHub::new("octo");
        gh.fail_on("authenticated_user", 401);
        let err = gh.authenticated_user().unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(gh.call_names(), vec!["authenticated_user"]);
        assert!(!gh.calls()[0].is_write());
    }
}
