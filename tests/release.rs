mod common;

use common::git_repo_with_tags;
use kavita_updater::release::{GitRemote, ReleaseSource};
use kavita_updater::UpdateError;

#[test]
fn git_remote_picks_highest_version_not_newest_tag() {
    let tmp = tempfile::tempdir().unwrap();
    // creation order differs from version order on purpose
    let Some(repo) = git_repo_with_tags(tmp.path(), &["v0.9.0", "v0.10.0", "v0.8.1"]) else {
        eprintln!("git not installed, skipping");
        return;
    };
    let remote = GitRemote::new(repo.display().to_string(), None);
    assert_eq!(remote.latest_tag().unwrap(), "v0.10.0");
}

#[test]
fn git_remote_without_tags_is_version_fetch_error() {
    let tmp = tempfile::tempdir().unwrap();
    let Some(repo) = git_repo_with_tags(tmp.path(), &[]) else {
        eprintln!("git not installed, skipping");
        return;
    };
    let err = GitRemote::new(repo.display().to_string(), None)
        .latest_tag()
        .unwrap_err();
    assert!(matches!(err, UpdateError::VersionFetch { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn unreachable_remote_is_version_fetch_error() {
    let tmp = tempfile::tempdir().unwrap();
    if which::which("git").is_err() {
        eprintln!("git not installed, skipping");
        return;
    }
    let missing = tmp.path().join("no-such-repo");
    let err = GitRemote::new(missing.display().to_string(), None)
        .latest_tag()
        .unwrap_err();
    assert!(matches!(err, UpdateError::VersionFetch { .. }));
}

#[test]
fn explicit_git_binary_that_does_not_exist_is_version_fetch_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = GitRemote::new("https://example.invalid/x.git", Some(tmp.path().join("git")))
        .latest_tag()
        .unwrap_err();
    assert_eq!(err.exit_code(), 4);
}
