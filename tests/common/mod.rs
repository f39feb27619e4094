// tests/common/mod.rs
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn manifest(version: &str) -> String {
    format!(
        "[package]\nname = \"app\"\nversion = \"{}\"\nedition = \"2021\"\n",
        version
    )
}

/// Writes `contents` to `file` and commits it on HEAD
pub fn commit_file(repo: &Repository, file: &str, contents: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("Repository has no workdir");
    fs::write(workdir.join(file), contents).expect("Could not write file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(file))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let sig = Signature::now("Release Gate", "gate@example.com").expect("Could not create sig");

    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Could not create commit")
}

/// Repository with a committed Cargo.toml declaring `version`
pub fn setup_repo(version: &str) -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Could not init repository");
    commit_file(&repo, "Cargo.toml", &manifest(version), "chore: release");
    (temp_dir, repo)
}

/// Bare repository usable as a remote
pub fn setup_remote() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");
    let repo = Repository::init_bare(temp_dir.path()).expect("Could not init bare repository");
    (temp_dir, repo)
}

pub fn has_tag(repo: &Repository, tag: &str) -> bool {
    repo.find_reference(&format!("refs/tags/{}", tag)).is_ok()
}
