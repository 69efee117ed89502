//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git reads the
//! release report needs, so the pipeline can run against a real repository
//! or an in-memory one in tests.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! # Usage
//!
//! Pipeline code depends on the [Repository] trait rather than on a concrete
//! implementation.
//!
//! ```rust
//! # use prerelease::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let trunk = repo.get_branch_head_oid("master")?;
//! let commits = repo.get_commits_between(None, trunk)?;
//! for commit in commits {
//!     println!("{} {}", commit.short_hash(), commit.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::{Git2Repository, SshAuth};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::Oid;

use crate::error::Result;

/// Commit information needed by the release report
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The commit object id
    pub oid: Oid,
    /// First line of the commit message
    pub subject: String,
    /// Committer timestamp
    pub time: DateTime<Utc>,
}

impl CommitInfo {
    pub fn new(oid: Oid, subject: impl Into<String>, time: DateTime<Utc>) -> Self {
        CommitInfo {
            oid,
            subject: subject.into(),
            time,
        }
    }

    /// Full 40-character hex hash
    pub fn hash(&self) -> String {
        self.oid.to_string()
    }

    /// Abbreviated 7-character hash
    pub fn short_hash(&self) -> String {
        let mut hash = self.hash();
        hash.truncate(7);
        hash
    }
}

/// One changed file between two trees.
///
/// `from_path` is `None` when the file only exists on the "to" side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub from_path: Option<PathBuf>,
    pub to_path: Option<PathBuf>,
}

impl FilePatch {
    /// A file present on both sides
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        FilePatch {
            from_path: Some(path.clone()),
            to_path: Some(path),
        }
    }

    /// A file only present on the "to" side
    pub fn only_in_to(path: impl Into<PathBuf>) -> Self {
        FilePatch {
            from_path: None,
            to_path: Some(path.into()),
        }
    }

    /// A file only present on the "from" side
    pub fn only_in_from(path: impl Into<PathBuf>) -> Self {
        FilePatch {
            from_path: Some(path.into()),
            to_path: None,
        }
    }
}

/// Read-only git operations used to build a release report
///
/// ## Error Handling
///
/// Methods return [crate::error::Result<T>]. Implementations map underlying
/// failures (like `git2::Error`) to the matching
/// [crate::error::PrereleaseError] variant with context naming the ref,
/// tag or commit involved.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation for mocking Git operations
pub trait Repository {
    /// Get the OID of the commit HEAD points at
    fn head_oid(&self) -> Result<Oid>;

    /// Get the OID of a local branch's tip
    ///
    /// # Arguments
    /// * `branch_name` - The name of the branch (e.g., "master", "main")
    ///
    /// # Returns
    /// * `Ok(Oid)` - Object ID of the branch's tip commit
    /// * `Err` - If the branch doesn't exist
    fn get_branch_head_oid(&self, branch_name: &str) -> Result<Oid>;

    /// Get all tag names, in the order the repository reports them
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Resolve a tag name to the commit it ultimately points at
    ///
    /// Handles both lightweight and annotated tags.
    fn resolve_tag(&self, tag_name: &str) -> Result<Oid>;

    /// Look up a single commit
    fn find_commit(&self, oid: Oid) -> Result<CommitInfo>;

    /// Get commits reachable from `to_oid` but not from `from_oid`
    ///
    /// Commits come back in traversal order, newest first. With no `from_oid`
    /// every commit reachable from `to_oid` is returned.
    ///
    /// # Example
    /// ```rust
    /// # use prerelease::git::Repository;
    /// # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
    /// let tag = repo.resolve_tag("v1.0.0")?;
    /// let trunk = repo.get_branch_head_oid("master")?;
    /// let since_tag = repo.get_commits_between(Some(tag), trunk)?;
    /// println!("{} commits since v1.0.0", since_tag.len());
    /// # Ok(())
    /// # }
    /// ```
    fn get_commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>>;

    /// Diff the trees of two commits, `from_oid` being the old side
    fn diff_commits(&self, from_oid: Oid, to_oid: Oid) -> Result<Vec<FilePatch>>;

    /// Read a file from the working copy, relative to the repository root
    fn read_worktree_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}
