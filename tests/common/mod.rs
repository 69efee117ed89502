//! Helpers for building throwaway git repositories in tests.
#![allow(dead_code)]

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Initialise an empty repository whose HEAD is `refs/heads/master`.
pub fn init_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    let repo = Repository::init_opts(temp_dir.path(), &opts).expect("Could not init git repo");
    (temp_dir, repo)
}

/// Write and delete files in the working copy, stage them and commit on HEAD.
pub fn commit(
    repo: &Repository,
    writes: &[(&str, &str)],
    removes: &[&str],
    message: &str,
    seconds: i64,
) -> Oid {
    let workdir = repo.workdir().expect("Repository has no workdir");
    let mut index = repo.index().expect("Could not get index");

    for (name, content) in writes {
        let path = workdir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Could not create directories");
        }
        fs::write(&path, content).expect("Could not write file");
        index
            .add_path(Path::new(name))
            .expect("Could not add file to index");
    }
    for name in removes {
        fs::remove_file(workdir.join(name)).expect("Could not remove file");
        index
            .remove_path(Path::new(name))
            .expect("Could not remove file from index");
    }
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
        .expect("Could not create signature");

    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Could not create commit")
}

/// Create a lightweight tag on `oid`.
pub fn tag_lightweight(repo: &Repository, name: &str, oid: Oid) {
    let object = repo.find_object(oid, None).expect("Could not find object");
    repo.tag_lightweight(name, &object, false)
        .expect("Could not create tag");
}

/// Create an annotated tag on `oid`.
pub fn tag_annotated(repo: &Repository, name: &str, oid: Oid, seconds: i64) {
    let object = repo.find_object(oid, None).expect("Could not find object");
    let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
        .expect("Could not create signature");
    repo.tag(name, &object, &sig, &format!("Release {}", name), false)
        .expect("Could not create tag");
}

/// A service repository with two releases and four commits on top of the
/// latest one:
///
/// * `v0.9.0` (annotated) on the bootstrap commit
/// * `v1.0.0` (lightweight) on the commit adding the first migrations
/// * then a modified migration, a new migration, a deleted migration and a
///   non-conventional commit
pub fn service_repo() -> (TempDir, Repository) {
    let (temp_dir, repo) = init_repo();

    let bootstrap = commit(&repo, &[("README.md", "orders\n")], &[], "chore: bootstrap", 500);
    tag_annotated(&repo, "v0.9.0", bootstrap, 600);

    let release = commit(
        &repo,
        &[
            ("db/000_legacy.sql", "CREATE TABLE legacy (id INT);"),
            ("db/001_users.sql", "CREATE TABLE users (id INT);"),
        ],
        &[],
        "feat(db): initial schema",
        1_000,
    );
    tag_lightweight(&repo, "v1.0.0", release);

    commit(
        &repo,
        &[("db/001_users.sql", "ALTER TABLE users ADD name TEXT;")],
        &[],
        "feat(users): [USR-12] add name column",
        2_000,
    );
    commit(
        &repo,
        &[("db/002_orders.sql", "CREATE TABLE orders (id INT);")],
        &[],
        "fix(orders) create orders table",
        3_000,
    );
    commit(
        &repo,
        &[],
        &["db/000_legacy.sql"],
        "chore(db)!: drop legacy table",
        4_000,
    );
    commit(
        &repo,
        &[("README.md", "orders service\n")],
        &[],
        "update readme",
        5_000,
    );

    (temp_dir, repo)
}
