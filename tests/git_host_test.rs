// tests/git_host_test.rs
mod common;

use common::{commit_file, has_tag, manifest, setup_remote, setup_repo};
use git2::Repository;
use release_gate::boundary::GateWarning;
use release_gate::domain::GateDecision;
use release_gate::host::{GitReleaseHost, ReleaseHost};
use release_gate::{GateError, ReleaseGate};

#[test]
fn test_create_tag_at_head() {
    let (dir, repo) = setup_repo("2.3.1");
    let head = repo.head().unwrap().peel_to_commit().unwrap().id();

    let host = GitReleaseHost::open(dir.path()).unwrap();
    assert!(!host.release_exists("v2.3.1").unwrap());
    assert!(host.create_tag("v2.3.1", "HEAD").unwrap());

    assert!(host.release_exists("v2.3.1").unwrap());
    assert_eq!(host.tag_target("v2.3.1").unwrap(), Some(head));
}

#[test]
fn test_create_existing_tag_returns_false() {
    let (dir, _repo) = setup_repo("1.0.0");
    let host = GitReleaseHost::open(dir.path()).unwrap();

    assert!(host.create_tag("v1.0.0", "HEAD").unwrap());
    assert!(!host.create_tag("v1.0.0", "HEAD").unwrap());
}

#[test]
fn test_create_tag_at_explicit_commit() {
    let (dir, repo) = setup_repo("1.0.0");
    let first = repo.head().unwrap().peel_to_commit().unwrap().id();
    commit_file(&repo, "README.md", "docs\n", "docs: readme");

    let host = GitReleaseHost::open(dir.path()).unwrap();
    let short = &first.to_string()[..10];
    assert!(host.create_tag("v1.0.0", short).unwrap());
    assert_eq!(host.tag_target("v1.0.0").unwrap(), Some(first));
}

#[test]
fn test_unknown_commit_is_config_error() {
    let (dir, _repo) = setup_repo("1.0.0");
    let host = GitReleaseHost::open(dir.path()).unwrap();

    let err = host.create_tag("v1.0.0", "no-such-branch").unwrap_err();
    assert!(matches!(err, GateError::Config(_)));
    assert!(!host.release_exists("v1.0.0").unwrap());
}

#[test]
fn test_invalid_tag_name_is_config_error() {
    let (dir, _repo) = setup_repo("1.0.0");
    let host = GitReleaseHost::open(dir.path()).unwrap();

    let err = host.release_exists("v1 0").unwrap_err();
    assert!(matches!(err, GateError::Config(_)));
}

#[test]
fn test_created_tag_is_pushed_to_remote() {
    let (dir, repo) = setup_repo("2.3.1");
    let (remote_dir, remote_repo) = setup_remote();
    repo.remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();

    let host = GitReleaseHost::open(dir.path())
        .unwrap()
        .with_remote("origin", true);
    assert!(host.pushes());

    let decision = ReleaseGate::new(&host)
        .evaluate(&manifest("2.3.1"), "HEAD")
        .unwrap();

    assert!(decision.is_proceed());
    assert!(has_tag(&repo, "v2.3.1"));
    assert!(has_tag(&remote_repo, "v2.3.1"));
}

#[test]
fn test_fetched_remote_tag_blocks_other_checkout() {
    let (dir_a, repo_a) = setup_repo("2.3.1");
    let (remote_dir, _remote_repo) = setup_remote();
    let remote_url = remote_dir.path().to_str().unwrap().to_string();
    repo_a.remote("origin", &remote_url).unwrap();

    let host_a = GitReleaseHost::open(dir_a.path())
        .unwrap()
        .with_remote("origin", true);
    assert!(ReleaseGate::new(&host_a)
        .evaluate(&manifest("2.3.1"), "HEAD")
        .unwrap()
        .is_proceed());

    // A second checkout that has never seen the tag locally
    let (dir_b, repo_b) = setup_repo("2.3.1");
    repo_b.remote("origin", &remote_url).unwrap();
    assert!(!has_tag(&repo_b, "v2.3.1"));

    let host_b = GitReleaseHost::open(dir_b.path())
        .unwrap()
        .with_remote("origin", true);
    host_b.fetch_tags().unwrap();

    let decision = ReleaseGate::new(&host_b)
        .evaluate(&manifest("2.3.1"), "HEAD")
        .unwrap();
    assert!(!decision.is_proceed());
}

#[test]
fn test_unreachable_remote_fetch_is_external_error() {
    let (dir, repo) = setup_repo("1.0.0");
    let missing = dir.path().join("no-such-remote.git");
    repo.remote("origin", missing.to_str().unwrap()).unwrap();

    let host = GitReleaseHost::open(dir.path())
        .unwrap()
        .with_remote("origin", true);
    let err = host.fetch_tags().unwrap_err();

    assert!(matches!(err, GateError::ExternalService(_)));
    assert!(!has_tag(&repo, "v1.0.0"));
}

#[test]
fn test_failed_push_rolls_back_local_tag() {
    let (dir, repo) = setup_repo("1.0.0");
    let missing = dir.path().join("no-such-remote.git");
    repo.remote("origin", missing.to_str().unwrap()).unwrap();

    let host = GitReleaseHost::open(dir.path())
        .unwrap()
        .with_remote("origin", true);
    let err = host.create_tag("v1.0.0", "HEAD").unwrap_err();

    assert!(matches!(err, GateError::ExternalService(_)));
    assert!(!has_tag(&Repository::open(dir.path()).unwrap(), "v1.0.0"));
}

/// Two checkouts of one remote at the same version but different commits,
/// neither having fetched the other's tag.
fn racing_checkouts() -> (
    (tempfile::TempDir, Repository),
    (tempfile::TempDir, Repository),
    (tempfile::TempDir, Repository),
) {
    let (remote_dir, remote_repo) = setup_remote();
    let remote_url = remote_dir.path().to_str().unwrap().to_string();

    let (dir_a, repo_a) = setup_repo("2.3.1");
    repo_a.remote("origin", &remote_url).unwrap();

    let (dir_b, repo_b) = setup_repo("2.3.1");
    commit_file(&repo_b, "NOTES.md", "b\n", "docs: notes");
    repo_b.remote("origin", &remote_url).unwrap();

    ((remote_dir, remote_repo), (dir_a, repo_a), (dir_b, repo_b))
}

fn remote_tag_commit(remote_repo: &Repository, tag: &str) -> git2::Oid {
    remote_repo
        .find_reference(&format!("refs/tags/{}", tag))
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id()
}

#[test]
fn test_push_never_replaces_remote_tag() {
    let ((_remote_dir, remote_repo), (dir_a, repo_a), (dir_b, repo_b)) = racing_checkouts();
    let head_a = repo_a.head().unwrap().peel_to_commit().unwrap().id();

    let host_a = GitReleaseHost::open(dir_a.path())
        .unwrap()
        .with_remote("origin", true);
    let host_b = GitReleaseHost::open(dir_b.path())
        .unwrap()
        .with_remote("origin", true);

    // Both checked before either created; only one may win.
    assert!(!host_a.release_exists("v2.3.1").unwrap());
    assert!(!host_b.release_exists("v2.3.1").unwrap());

    assert!(host_a.create_tag("v2.3.1", "HEAD").unwrap());
    assert!(!host_b.create_tag("v2.3.1", "HEAD").unwrap());

    assert_eq!(remote_tag_commit(&remote_repo, "v2.3.1"), head_a);
    assert!(!has_tag(&repo_b, "v2.3.1"));
}

#[test]
fn test_losing_checkout_aborts_with_concurrent_warning() {
    let ((_remote_dir, remote_repo), (dir_a, repo_a), (dir_b, repo_b)) = racing_checkouts();
    let head_a = repo_a.head().unwrap().peel_to_commit().unwrap().id();

    let host_a = GitReleaseHost::open(dir_a.path())
        .unwrap()
        .with_remote("origin", true);
    let first = ReleaseGate::new(&host_a)
        .evaluate(&manifest("2.3.1"), "HEAD")
        .unwrap();
    assert!(first.is_proceed());

    // The second checkout never fetched, so its own check still passes.
    let host_b = GitReleaseHost::open(dir_b.path())
        .unwrap()
        .with_remote("origin", true);
    let second = ReleaseGate::new(&host_b)
        .evaluate_with_warnings(&manifest("2.3.1"), "HEAD")
        .unwrap();

    assert!(matches!(second.decision, GateDecision::Abort { .. }));
    assert!(second.warnings.contains(&GateWarning::ConcurrentRelease {
        tag: "v2.3.1".to_string()
    }));
    assert_eq!(remote_tag_commit(&remote_repo, "v2.3.1"), head_a);
    assert!(!has_tag(&repo_b, "v2.3.1"));
}
