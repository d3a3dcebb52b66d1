use crate::cli::Cli;
use crate::command_handlers::build_updater;
use anyhow::{Context, Result};
use kavita_updater::config::UpdaterConfig;
use kavita_updater::fetch::DownloadProgress;
use kavita_updater::{UpdateError, UpdateReport, Updater};
use std::io::{BufRead, Write};

pub fn run_update(cli: &Cli, cfg: UpdaterConfig) -> Result<i32> {
    let pause = cfg.pause_on_exit;
    let updater = build_updater(cli, cfg);
    let code = match execute(&updater, cli.quiet) {
        Ok(report) => {
            tracing::info!(
                version = %report.version,
                bytes = report.bytes_downloaded,
                files = report.files_installed,
                "update finished"
            );
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    if pause {
        pause_for_enter(&mut std::io::stdin().lock(), &mut std::io::stdout())?;
    }
    Ok(code)
}

// Temporaries are discarded here, per error kind; a failed overlay is left as-is.
fn execute(updater: &Updater, quiet: bool) -> Result<UpdateReport, UpdateError> {
    let plan = updater.prepare()?;
    let mut progress = if quiet {
        DownloadProgress::hidden()
    } else {
        DownloadProgress::new()
    };
    match updater.apply(&plan, &mut progress, &mut std::io::stdout()) {
        Ok(report) => Ok(report),
        Err(e) => {
            plan.discard(e.partial_state());
            Err(e)
        }
    }
}

/// Prompts on `output` and blocks until one line (or EOF) is read from `input`.
fn pause_for_enter(input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
    write!(output, "press enter to exit")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("reading from stdin")?;
    Ok(())
}
