use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so the streamed Markdown on stdout stays clean.
/// `RUST_LOG` overrides the default; `--verbose` raises it to debug.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "tailor=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
