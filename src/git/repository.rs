use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{Delta, Oid, Repository as Git2Repo};
use tracing::{debug, info, instrument};

use crate::error::{PrereleaseError, Result};
use crate::git::{CommitInfo, FilePatch};

/// SSH credentials used when cloning a remote repository
#[derive(Debug, Clone)]
pub struct SshAuth {
    pub private_key: PathBuf,
    pub passphrase: Option<String>,
}

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            PrereleaseError::config(format!(
                "Not a git repository '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working copy, if the repository has one
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Clones `host/org/repo` over SSH into the system temp directory.
    ///
    /// An existing clone at the destination is fetched and its local branches
    /// are moved to the remote tips before it is used.
    ///
    /// # Returns
    /// * `Ok((repo, path))` - The opened repository and its local path
    /// * `Err` - If the shorthand is malformed or the clone or fetch fails
    #[instrument(skip(auth))]
    pub fn clone_remote(remote: &str, auth: &SshAuth) -> Result<(Self, PathBuf)> {
        let url = ssh_url(remote)?;
        let dest = std::env::temp_dir().join(remote.trim_matches('/'));
        let repo = Self::clone_or_update(&url, &dest, Some(auth))?;

        Ok((repo, dest))
    }

    /// Clone `url` into `dest`, or bring an earlier clone there up to date.
    pub fn clone_or_update(url: &str, dest: &Path, auth: Option<&SshAuth>) -> Result<Self> {
        if dest.join(".git").exists() {
            return Self::update_clone(url, dest, auth);
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let repo = git2::build::RepoBuilder::new()
            .fetch_options(fetch_options(auth))
            .clone(url, dest)
            .map_err(|e| PrereleaseError::remote(format!("Failed to clone '{}': {}", url, e)))?;

        info!(url = %url, path = %dest.display(), "cloned remote repository");
        Ok(Git2Repository { repo })
    }

    fn update_clone(url: &str, dest: &Path, auth: Option<&SshAuth>) -> Result<Self> {
        let fetch_failed =
            |e: git2::Error| PrereleaseError::remote(format!("Failed to fetch '{}': {}", url, e));

        let repo = Git2Repo::open(dest).map_err(fetch_failed)?;
        repo.find_remote("origin")
            .and_then(|mut origin| {
                origin.fetch(
                    &[
                        "+refs/heads/*:refs/remotes/origin/*",
                        "+refs/tags/*:refs/tags/*",
                    ],
                    Some(&mut fetch_options(auth)),
                    None,
                )
            })
            .map_err(fetch_failed)?;

        let mut updated = 0;
        for branch in repo.branches(Some(git2::BranchType::Remote))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()?.and_then(|n| n.strip_prefix("origin/")) else {
                continue;
            };
            let Some(target) = branch.get().target() else {
                continue;
            };
            if name == "HEAD" {
                continue;
            }
            repo.reference(
                &format!("refs/heads/{}", name),
                target,
                true,
                "prerelease: sync with origin",
            )?;
            updated += 1;
        }

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        repo.checkout_head(Some(&mut checkout))?;

        info!(url = %url, path = %dest.display(), branches = updated, "updated existing clone");
        Ok(Git2Repository { repo })
    }

    fn commit_time(commit: &git2::Commit<'_>) -> Result<DateTime<Utc>> {
        let seconds = commit.committer().when().seconds();
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            PrereleaseError::Git(git2::Error::from_str(&format!(
                "Commit {} has an out-of-range timestamp {}",
                commit.id(),
                seconds
            )))
        })
    }

    fn commit_tree(&self, oid: Oid) -> Result<git2::Tree<'_>> {
        self.repo
            .find_commit(oid)
            .and_then(|commit| commit.tree())
            .map_err(|e| PrereleaseError::diff(format!("Cannot read tree of {}: {}", oid, e)))
    }
}

fn fetch_options(auth: Option<&SshAuth>) -> git2::FetchOptions<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    if let Some(auth) = auth {
        callbacks.credentials(move |_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                &auth.private_key,
                auth.passphrase.as_deref(),
            )
        });
    }

    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    fetch_options
}

/// Rewrites `host/org/repo` into an SSH clone URL, `git@host:/org/repo`.
pub fn ssh_url(remote: &str) -> Result<String> {
    let parts: Vec<&str> = remote.trim_matches('/').split('/').collect();
    match parts.as_slice() {
        [host, org, name] if !host.is_empty() && !org.is_empty() && !name.is_empty() => {
            Ok(format!("git@{}:/{}/{}", host, org, name))
        }
        _ => Err(PrereleaseError::remote(format!(
            "Expected remote in the form host/org/repo, got '{}'",
            remote
        ))),
    }
}

impl super::Repository for Git2Repository {
    fn head_oid(&self) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| PrereleaseError::branch(format!("Cannot resolve HEAD: {}", e)))?;

        Ok(head.id())
    }

    fn get_branch_head_oid(&self, branch_name: &str) -> Result<Oid> {
        let branch = self
            .repo
            .find_branch(branch_name, git2::BranchType::Local)
            .map_err(|e| {
                PrereleaseError::branch(format!("Cannot find branch '{}': {}", branch_name, e))
            })?;

        let oid = branch.get().target().ok_or_else(|| {
            PrereleaseError::branch(format!("Branch '{}' has no target", branch_name))
        })?;

        Ok(oid)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn resolve_tag(&self, tag_name: &str) -> Result<Oid> {
        let reference_name = format!("refs/tags/{}", tag_name);

        let commit = self
            .repo
            .find_reference(&reference_name)
            .and_then(|reference| reference.peel_to_commit())
            .map_err(|e| {
                PrereleaseError::tag(format!("Cannot resolve tag '{}': {}", tag_name, e))
            })?;

        Ok(commit.id())
    }

    fn find_commit(&self, oid: Oid) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(oid)?;
        let subject = commit
            .message()
            .and_then(|message| message.lines().next())
            .unwrap_or_default()
            .to_string();

        Ok(CommitInfo::new(oid, subject, Self::commit_time(&commit)?))
    }

    fn get_commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;

        revwalk.push(to_oid)?;
        if let Some(from_oid) = from_oid {
            revwalk.hide(from_oid)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            commits.push(self.find_commit(oid_result?)?);
        }

        debug!(count = commits.len(), "walked commit range");
        Ok(commits)
    }

    fn diff_commits(&self, from_oid: Oid, to_oid: Oid) -> Result<Vec<FilePatch>> {
        let from_tree = self.commit_tree(from_oid)?;
        let to_tree = self.commit_tree(to_oid)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)
            .map_err(|e| {
                PrereleaseError::diff(format!(
                    "Cannot diff {} against {}: {}",
                    from_oid, to_oid, e
                ))
            })?;

        let patches = diff
            .deltas()
            .map(|delta| {
                let old_path = delta.old_file().path().map(Path::to_path_buf);
                let new_path = delta.new_file().path().map(Path::to_path_buf);
                match delta.status() {
                    Delta::Added => FilePatch {
                        from_path: None,
                        to_path: new_path,
                    },
                    Delta::Deleted => FilePatch {
                        from_path: old_path,
                        to_path: None,
                    },
                    _ => FilePatch {
                        from_path: old_path,
                        to_path: new_path,
                    },
                }
            })
            .collect();

        Ok(patches)
    }

    fn read_worktree_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let workdir = self.repo.workdir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "repository has no working directory",
            )
        })?;

        std::fs::read(workdir.join(path))
    }
}
