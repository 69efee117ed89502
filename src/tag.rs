use git2::Oid;
use tracing::{debug, info, instrument};

use crate::error::{PrereleaseError, Result};
use crate::git::Repository;

/// The tag whose target commit was committed most recently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestTag {
    pub name: String,
    pub commit: Oid,
}

/// Find the tag pointing at the most recently committed commit.
///
/// Tags are visited in the order the repository lists them and the first
/// tag wins a timestamp tie. Any tag that can't be resolved aborts the whole
/// lookup.
///
/// # Returns
/// * `Ok(Some(tag))` - The latest tag
/// * `Ok(None)` - If the repository has no tags
/// * `Err` - If listing tags or resolving any tag's commit fails
#[instrument(skip(repo))]
pub fn resolve_latest_tag<R: Repository>(repo: &R) -> Result<Option<LatestTag>> {
    let mut latest: Option<(LatestTag, chrono::DateTime<chrono::Utc>)> = None;

    for name in repo.list_tags()? {
        let oid = repo.resolve_tag(&name)?;
        let commit = repo.find_commit(oid).map_err(|e| {
            PrereleaseError::tag(format!(
                "Cannot read commit {} for tag '{}': {}",
                oid, name, e
            ))
        })?;
        debug!(tag = %name, commit = %commit.short_hash(), time = %commit.time, "inspected tag");

        let is_newer = match &latest {
            Some((_, time)) => commit.time > *time,
            None => true,
        };
        if is_newer {
            latest = Some((LatestTag { name, commit: oid }, commit.time));
        }
    }

    let latest = latest.map(|(tag, _)| tag);
    match &latest {
        Some(tag) => info!(tag = %tag.name, commit = %tag.commit, "resolved latest tag"),
        None => info!("repository has no tags"),
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{CommitInfo, MockRepository};
    use chrono::{DateTime, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).unwrap()
    }

    #[test]
    fn test_no_tags_yields_none() {
        let repo = MockRepository::new();
        assert_eq!(resolve_latest_tag(&repo).unwrap(), None);
    }

    #[test]
    fn test_picks_most_recent_commit() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new(oid(1), "old", at(1_000)));
        repo.add_commit(CommitInfo::new(oid(2), "new", at(3_000)));
        repo.add_commit(CommitInfo::new(oid(3), "mid", at(2_000)));
        repo.add_tag("v1.0.0", oid(1));
        repo.add_tag("v1.2.0", oid(2));
        repo.add_tag("v1.1.0", oid(3));

        let latest = resolve_latest_tag(&repo).unwrap().unwrap();
        assert_eq!(latest.name, "v1.2.0");
        assert_eq!(latest.commit, oid(2));
    }

    #[test]
    fn test_first_tag_wins_ties() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new(oid(1), "a", at(5_000)));
        repo.add_commit(CommitInfo::new(oid(2), "b", at(5_000)));
        repo.add_tag("release-b", oid(2));
        repo.add_tag("release-a", oid(1));

        let latest = resolve_latest_tag(&repo).unwrap().unwrap();
        assert_eq!(latest.name, "release-b");
    }

    #[test]
    fn test_two_tags_on_same_commit_keep_first() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new(oid(1), "a", at(5_000)));
        repo.add_tag("v2.0.0", oid(1));
        repo.add_tag("v2.0.0-rc1", oid(1));

        let latest = resolve_latest_tag(&repo).unwrap().unwrap();
        assert_eq!(latest.name, "v2.0.0");
    }

    #[test]
    fn test_unresolvable_tag_aborts() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new(oid(1), "a", at(9_000)));
        repo.add_tag("v1.0.0", oid(1));
        repo.add_tag("broken", oid(7));

        let err = resolve_latest_tag(&repo).unwrap_err();
        assert!(matches!(err, PrereleaseError::Tag(_)));
        assert!(err.to_string().contains("broken"));
    }
}
