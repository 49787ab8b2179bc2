use tracing_subscriber::EnvFilter;

/// Log to stderr, honouring RUST_LOG.
/// Verbose raises this crate to debug.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("energy_dashboard={}", level)
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
