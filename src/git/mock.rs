use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::Oid;

use crate::error::{PrereleaseError, Result};
use crate::git::{CommitInfo, FilePatch, Repository};

/// Mock repository for testing without actual git operations.
///
/// Tags and commits keep their insertion order, which stands in for the
/// repository's tag listing order and newest-first traversal order.
pub struct MockRepository {
    head: Option<Oid>,
    branch_heads: HashMap<String, Oid>,
    tags: Vec<(String, Oid)>,
    commits: Vec<CommitInfo>,
    patches: Vec<FilePatch>,
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            head: None,
            branch_heads: HashMap::new(),
            tags: Vec::new(),
            commits: Vec::new(),
            patches: Vec::new(),
            files: HashMap::new(),
        }
    }

    /// Add a commit; add newest commits first
    pub fn add_commit(&mut self, info: CommitInfo) {
        self.commits.push(info);
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.push((name.into(), oid));
    }

    /// Set a branch head
    pub fn set_branch_head(&mut self, branch: impl Into<String>, oid: Oid) {
        self.branch_heads.insert(branch.into(), oid);
    }

    /// Set the commit HEAD points at
    pub fn set_head(&mut self, oid: Oid) {
        self.head = Some(oid);
    }

    /// Add a patch to what `diff_commits` reports
    pub fn add_patch(&mut self, patch: FilePatch) {
        self.patches.push(patch);
    }

    /// Put a file into the mock working copy
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head_oid(&self) -> Result<Oid> {
        self.head.ok_or_else(|| PrereleaseError::branch("HEAD is not set"))
    }

    fn get_branch_head_oid(&self, branch_name: &str) -> Result<Oid> {
        self.branch_heads.get(branch_name).copied().ok_or_else(|| {
            PrereleaseError::branch(format!("Branch not found: {}", branch_name))
        })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.iter().map(|(name, _)| name.clone()).collect())
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<Oid> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag_name)
            .map(|(_, oid)| *oid)
            .ok_or_else(|| PrereleaseError::tag(format!("Tag not found: {}", tag_name)))
    }

    fn find_commit(&self, oid: Oid) -> Result<CommitInfo> {
        self.commits
            .iter()
            .find(|commit| commit.oid == oid)
            .cloned()
            .ok_or_else(|| {
                PrereleaseError::Git(git2::Error::from_str(&format!(
                    "Commit not found: {}",
                    oid
                )))
            })
    }

    fn get_commits_between(&self, from_oid: Option<Oid>, _to_oid: Oid) -> Result<Vec<CommitInfo>> {
        // Simplified: every stored commit up to (not including) `from_oid`
        Ok(self
            .commits
            .iter()
            .take_while(|commit| Some(commit.oid) != from_oid)
            .cloned()
            .collect())
    }

    fn diff_commits(&self, _from_oid: Oid, _to_oid: Oid) -> Result<Vec<FilePatch>> {
        Ok(self.patches.clone())
    }

    fn read_worktree_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}
