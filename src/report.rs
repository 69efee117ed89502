//! Release report assembly
//!
//! Resolves the repository state once, then builds the changelog and the
//! schema script from it and composes them into a single markdown document.

use git2::Oid;
use tracing::{info, instrument, warn};

use crate::changelog::{ChangelogCollection, ChangelogOptions};
use crate::config::Config;
use crate::conventional::CommitParser;
use crate::error::Result;
use crate::git::Repository;
use crate::schema::extract_schema_script;
use crate::tag::{resolve_latest_tag, LatestTag};

/// Resolved refs the report is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseState {
    pub head: Oid,
    pub latest_tag: Option<LatestTag>,
    pub trunk_branch: String,
}

impl ReleaseState {
    /// Read HEAD and find the latest tag
    #[instrument(skip(repo))]
    pub fn resolve<R: Repository>(repo: &R, trunk_branch: &str) -> Result<Self> {
        let head = repo.head_oid()?;
        let latest_tag = resolve_latest_tag(repo)?;

        Ok(ReleaseState {
            head,
            latest_tag,
            trunk_branch: trunk_branch.to_string(),
        })
    }
}

/// Parse every commit on trunk since the latest tag into a changelog.
///
/// Commits that don't follow the commit grammar are left out.
pub fn collect_changelog<R: Repository>(
    repo: &R,
    state: &ReleaseState,
    options: ChangelogOptions,
) -> Result<ChangelogCollection> {
    let trunk = repo.get_branch_head_oid(&state.trunk_branch)?;
    let since = state.latest_tag.as_ref().map(|tag| tag.commit);
    let commits = repo.get_commits_between(since, trunk)?;

    let parser = CommitParser::new();
    let mut changelog = ChangelogCollection::new(options);
    for commit in &commits {
        if let Some(entry) = parser.parse(&commit.subject) {
            changelog.add(entry.with_commit_ref(commit.hash()));
        }
    }

    info!(
        commits = commits.len(),
        entries = changelog.len(),
        "collected changelog"
    );
    Ok(changelog)
}

/// Schema script for files changed between HEAD and the latest tag.
///
/// Without a tag there is nothing to compare against and the script is empty.
pub fn schema_script<R: Repository>(
    repo: &R,
    state: &ReleaseState,
    suffix: &str,
) -> Result<String> {
    match &state.latest_tag {
        Some(tag) => extract_schema_script(repo, state.head, tag.commit, suffix),
        None => {
            warn!("no tag found, skipping schema script");
            Ok(String::new())
        }
    }
}

/// The composed release document
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub service_name: String,
    pub latest_tag: Option<LatestTag>,
    pub changelog: ChangelogCollection,
    pub schema_script: String,
}

impl ReleaseReport {
    /// Render the report as markdown
    pub fn to_markdown(&self) -> String {
        let mut markdown = String::new();

        markdown.push_str("**Service**: \n* ");
        markdown.push_str(&self.service_name);
        markdown.push_str("\n\n");
        markdown.push_str(&self.changelog.render());
        markdown.push_str("## SQL Scripts\n");
        markdown.push_str("```sql\n");
        markdown.push_str(&self.schema_script);
        markdown.push_str("\n```\n");

        markdown
    }
}

/// Run the whole pipeline against `repo`
#[instrument(skip(repo, config))]
pub fn build_release_report<R: Repository>(
    repo: &R,
    config: &Config,
    service_name: &str,
) -> Result<ReleaseReport> {
    let state = ReleaseState::resolve(repo, &config.repository.trunk_branch)?;
    let schema_script = schema_script(repo, &state, &config.schema.suffix)?;
    let changelog = collect_changelog(repo, &state, config.changelog.to_options())?;

    Ok(ReleaseReport {
        service_name: service_name.to_string(),
        latest_tag: state.latest_tag,
        changelog,
        schema_script,
    })
}
