use crate::cli::Cli;
use crate::command_handlers::build_updater;
use anyhow::Result;
use kavita_updater::config::UpdaterConfig;

pub fn show_plan(cli: &Cli, cfg: UpdaterConfig) -> Result<i32> {
    let updater = build_updater(cli, cfg);
    let plan = match updater.prepare() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(e.exit_code());
        }
    };
    println!("platform: {} {}", plan.platform.os, plan.platform.arch);
    println!("version:  {}", plan.version);
    println!("url:      {}", plan.url);
    println!("archive:  {}", plan.archive.display());
    if plan.staging_preexisted {
        println!("staging:  {} (already exists)", plan.staging.display());
    } else {
        println!("staging:  {}", plan.staging.display());
    }
    println!("exclude:  {}", updater.config().exclude);
    Ok(0)
}
