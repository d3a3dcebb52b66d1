mod cli;
mod command_handlers;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use kavita_updater::config::UpdaterConfig;
use kavita_updater::UpdateError;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let mut cfg = match UpdaterConfig::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            let err = UpdateError::Config(format!("{e:#}"));
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    };
    cli.apply_overrides(&mut cfg);
    let code = command_handlers::dispatch::dispatch(&cli, cfg)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
