use anyhow::{Context, Result};
use fs_err as fs;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

pub const CONFIG_FILE: &str = "kavita-updater.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct UpdaterConfig {
    /// Display name used in status lines
    pub app_name: String,
    /// Git remote queried for release tags
    pub repository: String,
    /// Base URL the platform archive name is appended to
    pub download_base: String,
    /// Archive names are `{archive_prefix}-{os}-{arch}.tar.gz`
    pub archive_prefix: String,
    /// Top-level folder inside the archive that gets overlaid
    pub app_dir: String,
    /// Archive entries whose path contains this are never extracted
    pub exclude: String,
    pub install_dir: PathBuf,
    pub pause_on_exit: bool,
    /// Explicit git binary; looked up on PATH otherwise
    pub git: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub platform: PlatformOverride,
}

/// Replaces the probed system/machine strings before detection.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformOverride {
    pub os: Option<String>,
    pub arch: Option<String>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            app_name: "Kavita".into(),
            repository: "https://github.com/Kareadita/Kavita.git".into(),
            download_base: "https://github.com/Kareadita/Kavita/releases/latest/download".into(),
            archive_prefix: "kavita".into(),
            app_dir: "Kavita".into(),
            exclude: "config".into(),
            install_dir: PathBuf::from("."),
            pause_on_exit: true,
            git: None,
            http_timeout_secs: None,
            platform: PlatformOverride::default(),
        }
    }
}

impl UpdaterConfig {
    /// An explicit path must exist. Otherwise the first of
    /// `./kavita-updater.toml` and `<config dir>/kavita-updater/config.toml`
    /// is used, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for candidate in default_locations() {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg = Self::parse(&data).with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Also run by `Updater::prepare`, since configs can be built in code.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("repository", &self.repository),
            ("download_base", &self.download_base),
            ("archive_prefix", &self.archive_prefix),
            ("app_dir", &self.app_dir),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("'{key}' must not be empty");
            }
        }
        // staging is removed recursively, so "." or ".." would take the
        // install directory or its parent with it
        let parts: Vec<Component> = Path::new(&self.app_dir).components().collect();
        if !matches!(parts[..], [Component::Normal(_)]) {
            anyhow::bail!("'app_dir' must be a single directory name, got '{}'", self.app_dir);
        }
        Ok(())
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        out.push(dir.join("kavita-updater").join("config.toml"));
    }
    out
}
