use crate::archive::{self, ExtractSummary};
use crate::config::UpdaterConfig;
use crate::error::{PartialState, UpdateError};
use crate::fetch::{self, ProgressReporter};
use crate::platform::{self, HostProbe, Platform};
use crate::release::ReleaseSource;
use fs_err as fs;
use std::io::Write;
use std::path::PathBuf;

/// Everything resolved before the install directory is touched.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub platform: Platform,
    pub version: String,
    pub url: String,
    pub archive: PathBuf,
    pub staging: PathBuf,
    /// A staging directory left behind before this run is never discarded.
    pub staging_preexisted: bool,
    pub install_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub version: String,
    pub bytes_downloaded: u64,
    pub extract: ExtractSummary,
    pub files_installed: usize,
}

pub struct Updater {
    config: UpdaterConfig,
    source: Box<dyn ReleaseSource>,
    probe: &'static dyn HostProbe,
    pinned: Option<Platform>,
}

/// `{download_base}/{archive_prefix}-{os}-{arch}.tar.gz`
pub fn download_url(platform: &Platform, cfg: &UpdaterConfig) -> String {
    format!(
        "{}/{}-{}-{}.tar.gz",
        cfg.download_base.trim_end_matches('/'),
        cfg.archive_prefix,
        platform.os,
        platform.arch
    )
}

impl Updater {
    pub fn new(config: UpdaterConfig, source: Box<dyn ReleaseSource>) -> Self {
        Self {
            config,
            source,
            probe: platform::host(),
            pinned: None,
        }
    }

    /// Skip host detection and use this platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.pinned = Some(platform);
        self
    }

    pub fn with_probe(mut self, probe: &'static dyn HostProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    fn resolve_platform(&self) -> Result<Platform, UpdateError> {
        if let Some(p) = &self.pinned {
            return Ok(p.clone());
        }
        let overrides = &self.config.platform;
        if overrides.os.is_none() && overrides.arch.is_none() {
            return platform::detect_host(self.probe);
        }
        let system = overrides.os.clone().unwrap_or_else(|| self.probe.system());
        let (machine, processor) = match &overrides.arch {
            Some(arch) => (arch.clone(), String::new()),
            None => (self.probe.machine(), self.probe.processor()),
        };
        tracing::debug!(%system, %machine, "using configured platform override");
        platform::detect(&system, &machine, &processor)
    }

    pub fn prepare(&self) -> Result<UpdatePlan, UpdateError> {
        self.config
            .validate()
            .map_err(|e| UpdateError::Config(format!("{e:#}")))?;
        let install_dir = self.config.install_dir.clone();
        if !install_dir.is_dir() {
            return Err(UpdateError::Config(format!(
                "install directory {} does not exist",
                install_dir.display()
            )));
        }
        let platform = self.resolve_platform()?;
        tracing::info!(%platform, "detected platform");
        tracing::info!(source = %self.source.describe(), "resolving latest release");
        let version = self.source.latest_tag()?;
        let url = download_url(&platform, &self.config);
        let archive =
            install_dir.join(format!("{}-{}.tar.gz", self.config.archive_prefix, version));
        let staging = install_dir.join(&self.config.app_dir);
        let staging_preexisted = staging.exists();
        if staging_preexisted {
            tracing::warn!(path = %staging.display(), "staging directory already exists");
        }
        Ok(UpdatePlan {
            platform,
            version,
            url,
            archive,
            staging,
            staging_preexisted,
            install_dir,
        })
    }

    /// Status lines go to `out`, progress to `reporter`.
    pub fn apply(
        &self,
        plan: &UpdatePlan,
        reporter: &mut dyn ProgressReporter,
        out: &mut dyn Write,
    ) -> Result<UpdateReport, UpdateError> {
        let client = fetch::http_client(self.config.http_timeout_secs)?;

        status(
            out,
            format_args!(
                "Downloading latest {} release ({}) for {} {}...",
                self.config.app_name, plan.version, plan.platform.os, plan.platform.arch
            ),
        );
        let bytes_downloaded = fetch::fetch(&client, &plan.url, &plan.archive, reporter)?;

        status(out, format_args!("Extracting update..."));
        let extract = archive::extract_tar(&plan.archive, &self.config.exclude, &plan.install_dir)?;
        tracing::info!(
            extracted = extract.extracted,
            skipped = extract.skipped,
            "archive extracted"
        );
        status(out, format_args!("Extraction complete."));

        status(out, format_args!("Installing update files..."));
        let files_installed = archive::overlay_dir(&plan.staging, &plan.install_dir)?;
        status(out, format_args!("Update files installed."));

        status(out, format_args!("Removing temporary files..."));
        archive::remove_temporaries(&plan.staging, &plan.archive)?;
        status(out, format_args!("Temporary files removed."));

        status(out, format_args!("Update complete."));
        Ok(UpdateReport {
            version: plan.version.clone(),
            bytes_downloaded,
            extract,
            files_installed,
        })
    }
}

// A closed stdout must not fail an update that is otherwise succeeding.
fn status(out: &mut dyn Write, line: std::fmt::Arguments) {
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        tracing::debug!("could not write status line: {e}");
    }
}

impl UpdatePlan {
    /// Best-effort removal of temporaries left by a failed run.
    pub fn discard(&self, state: PartialState) {
        if state == PartialState::Nothing {
            return;
        }
        if self.archive.exists() {
            match fs::remove_file(&self.archive) {
                Ok(()) => tracing::info!(path = %self.archive.display(), "removed partial archive"),
                Err(e) => tracing::warn!("could not remove partial archive: {e}"),
            }
        }
        if state == PartialState::ArchiveAndStaging && self.staging_preexisted {
            tracing::warn!(
                path = %self.staging.display(),
                "staging directory existed before this run, leaving it"
            );
        } else if state == PartialState::ArchiveAndStaging && self.staging.exists() {
            match fs::remove_dir_all(&self.staging) {
                Ok(()) => tracing::info!(path = %self.staging.display(), "removed staging directory"),
                Err(e) => tracing::warn!("could not remove staging directory: {e}"),
            }
        }
    }
}
