//! Schema script extraction.
//!
//! Collects the files matching a suffix (usually `.sql`) that differ between
//! two commits and concatenates their current working-copy contents.

use std::path::PathBuf;

use git2::Oid;
use tracing::{debug, instrument};

use crate::error::{PrereleaseError, Result};
use crate::git::Repository;

/// Default suffix for schema files
pub const DEFAULT_SCHEMA_SUFFIX: &str = ".sql";

/// Paths of changed files matching `suffix`, in diff order.
///
/// Only the "from" side of each patch is considered; patches without one are
/// skipped.
pub fn changed_schema_files<R: Repository>(
    repo: &R,
    from: Oid,
    to: Oid,
    suffix: &str,
) -> Result<Vec<PathBuf>> {
    let paths = repo
        .diff_commits(from, to)?
        .into_iter()
        .filter_map(|patch| patch.from_path)
        .filter(|path| path.to_string_lossy().ends_with(suffix))
        .collect();

    Ok(paths)
}

/// Build the schema script for the files changed between `from` and `to`.
///
/// Each file is emitted as a `-- <path>` header line followed by its current
/// working-copy content and a blank line. A file that can't be read fails the
/// whole extraction.
#[instrument(skip(repo))]
pub fn extract_schema_script<R: Repository>(
    repo: &R,
    from: Oid,
    to: Oid,
    suffix: &str,
) -> Result<String> {
    let paths = changed_schema_files(repo, from, to, suffix)?;
    debug!(count = paths.len(), "found changed schema files");

    let mut script = String::new();
    for path in paths {
        let content = repo
            .read_worktree_file(&path)
            .map_err(|e| PrereleaseError::schema_file(&path, e))?;

        script.push_str("-- ");
        script.push_str(&path.to_string_lossy());
        script.push('\n');
        script.push_str(&String::from_utf8_lossy(&content));
        script.push_str("\n\n");
    }

    Ok(script)
}
