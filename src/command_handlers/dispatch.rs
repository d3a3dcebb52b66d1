use crate::cli::{Cli, Commands};
use crate::command_handlers::{plan, update};
use anyhow::Result;
use kavita_updater::config::UpdaterConfig;

/// Returns the process exit code.
pub fn dispatch(cli: &Cli, cfg: UpdaterConfig) -> Result<i32> {
    match cli.command.unwrap_or(Commands::Update) {
        Commands::Update => update::run_update(cli, cfg),
        Commands::Plan => plan::show_plan(cli, cfg),
    }
}
