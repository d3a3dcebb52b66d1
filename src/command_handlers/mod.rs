pub mod dispatch;
pub mod plan;
pub mod update;

use crate::cli::Cli;
use kavita_updater::config::UpdaterConfig;
use kavita_updater::release::{FixedTag, GitRemote, ReleaseSource};
use kavita_updater::Updater;

pub fn build_updater(cli: &Cli, cfg: UpdaterConfig) -> Updater {
    let source: Box<dyn ReleaseSource> = match &cli.tag {
        Some(tag) => Box::new(FixedTag(tag.clone())),
        None => Box::new(GitRemote::new(cfg.repository.clone(), cfg.git.clone())),
    };
    Updater::new(cfg, source)
}
