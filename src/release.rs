use crate::error::UpdateError;
use std::path::PathBuf;
use std::process::Command;

/// Where the latest release tag comes from.
pub trait ReleaseSource {
    fn latest_tag(&self) -> Result<String, UpdateError>;
    fn describe(&self) -> String;
}

/// Queries a git remote's tags sorted by version and takes the last one.
pub struct GitRemote {
    git: Option<PathBuf>,
    url: String,
}

impl GitRemote {
    pub fn new(url: impl Into<String>, git: Option<PathBuf>) -> Self {
        Self {
            git,
            url: url.into(),
        }
    }

    fn git_binary(&self) -> Result<PathBuf, UpdateError> {
        match &self.git {
            Some(p) => Ok(p.clone()),
            None => which::which("git")
                .map_err(|e| UpdateError::version_fetch(&self.url, format!("git not found: {e}"))),
        }
    }
}

impl ReleaseSource for GitRemote {
    fn latest_tag(&self) -> Result<String, UpdateError> {
        let git = self.git_binary()?;
        tracing::debug!(git = %git.display(), remote = %self.url, "listing remote tags");
        let output = Command::new(&git)
            .args(["ls-remote", "--tags", "--refs", "--sort=version:refname"])
            .arg(&self.url)
            .output()
            .map_err(|e| UpdateError::version_fetch(&self.url, format!("running git: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UpdateError::version_fetch(
                &self.url,
                format!("git ls-remote exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| UpdateError::version_fetch(&self.url, format!("non utf-8 output: {e}")))?;
        let tag = parse_latest_tag(&stdout)
            .ok_or_else(|| UpdateError::version_fetch(&self.url, "remote has no tags"))?;
        warn_if_not_semver(&tag);
        Ok(tag)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A tag supplied up front; no remote is contacted.
pub struct FixedTag(pub String);

impl ReleaseSource for FixedTag {
    fn latest_tag(&self) -> Result<String, UpdateError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("fixed tag {}", self.0)
    }
}

/// Last non-empty line of `ls-remote` output, reduced to the part after
/// the final `/` (`<sha>\trefs/tags/v0.8.0` -> `v0.8.0`).
pub fn parse_latest_tag(ls_remote: &str) -> Option<String> {
    let line = ls_remote.lines().rev().find(|l| !l.trim().is_empty())?;
    let tag = line.trim().rsplit('/').next()?;
    Some(tag.to_string())
}

fn warn_if_not_semver(tag: &str) {
    if semver::Version::parse(tag.trim_start_matches('v')).is_err() {
        tracing::warn!(%tag, "latest tag is not a semantic version, using it anyway");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_line_tail() {
        let out = "aaa\trefs/tags/v0.7.0\nbbb\trefs/tags/v0.7.14\nccc\trefs/tags/v0.8.0\n";
        assert_eq!(parse_latest_tag(out).as_deref(), Some("v0.8.0"));
    }

    #[test]
    fn ignores_trailing_blank_lines() {
        let out = "aaa\trefs/tags/v1.2.3\n\n  \n";
        assert_eq!(parse_latest_tag(out).as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn nested_tag_names_keep_only_last_segment() {
        let out = "aaa\trefs/tags/release/v2.0.0";
        assert_eq!(parse_latest_tag(out).as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn line_without_separator_is_returned_whole() {
        assert_eq!(parse_latest_tag("nightly").as_deref(), Some("nightly"));
    }

    #[test]
    fn empty_output_has_no_tag() {
        assert_eq!(parse_latest_tag(""), None);
        assert_eq!(parse_latest_tag("\n\n"), None);
    }

    #[test]
    fn fixed_tag_is_returned_verbatim() {
        assert_eq!(FixedTag("v9.9.9".into()).latest_tag().unwrap(), "v9.9.9");
    }

    #[test]
    fn missing_git_binary_is_version_fetch_error() {
        let remote = GitRemote::new(
            "https://example.invalid/repo.git",
            Some(PathBuf::from("/definitely/not/git")),
        );
        let err = remote.latest_tag().unwrap_err();
        assert!(matches!(err, UpdateError::VersionFetch { .. }));
    }
}
