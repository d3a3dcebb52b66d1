use thiserror::Error;

/// One variant per pipeline step. The top-level handler maps each to an
/// exit code and decides what partial state to discard.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported platform: system '{system}' (machine '{machine}')")]
    UnsupportedPlatform { system: String, machine: String },

    #[error("could not resolve latest release from {remote}: {reason}")]
    VersionFetch { remote: String, reason: String },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("extracting {archive} failed: {source}")]
    Extract {
        archive: String,
        #[source]
        source: std::io::Error,
    },

    #[error("installing update files into {path} failed: {source}")]
    Overlay {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("removing temporary files failed: {source}")]
    Cleanup {
        #[source]
        source: std::io::Error,
    },
}

/// What the top-level handler should discard after a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialState {
    Nothing,
    Archive,
    ArchiveAndStaging,
}

impl UpdateError {
    pub fn exit_code(&self) -> i32 {
        match self {
            UpdateError::Config(_) => 2,
            UpdateError::UnsupportedPlatform { .. } => 3,
            UpdateError::VersionFetch { .. } => 4,
            UpdateError::Download { .. } => 5,
            UpdateError::Extract { .. } => 6,
            UpdateError::Overlay { .. } => 7,
            UpdateError::Cleanup { .. } => 8,
        }
    }

    /// Temporaries are only discarded when the install directory was not
    /// touched yet. After a failed overlay everything is left in place.
    pub fn partial_state(&self) -> PartialState {
        match self {
            UpdateError::Download { .. } => PartialState::Archive,
            UpdateError::Extract { .. } => PartialState::ArchiveAndStaging,
            _ => PartialState::Nothing,
        }
    }

    pub(crate) fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        UpdateError::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn version_fetch(remote: &str, reason: impl std::fmt::Display) -> Self {
        UpdateError::VersionFetch {
            remote: remote.to_string(),
            reason: reason.to_string(),
        }
    }
}
