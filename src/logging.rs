use tracing_subscriber::EnvFilter;

/// RUST_LOG wins; otherwise warn, info with -v, debug with -vv.
/// Logs go to stderr so the status lines on stdout stay clean.
pub fn init(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "kavita_updater=info",
        _ => "kavita_updater=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
