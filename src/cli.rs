use clap::{Parser, Subcommand};
use kavita_updater::config::UpdaterConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "kavita-updater",
    about = "Download the latest Kavita release for this platform and install it over the current directory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config (defaults to ./kavita-updater.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to update (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub install_dir: Option<PathBuf>,

    /// Use this release tag instead of querying the remote
    #[arg(long, global = true)]
    pub tag: Option<String>,

    /// Exit without waiting for enter
    #[arg(long, global = true)]
    pub no_pause: bool,

    /// Hide the download progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Download and install the latest release (default)
    Update,
    /// Show platform, version and download URL without changing anything
    Plan,
}

impl Cli {
    pub fn apply_overrides(&self, cfg: &mut UpdaterConfig) {
        if let Some(dir) = &self.install_dir {
            cfg.install_dir = dir.clone();
        }
        if self.no_pause {
            cfg.pause_on_exit = false;
        }
    }
}
