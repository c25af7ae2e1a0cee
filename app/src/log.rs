use tracing_subscriber::EnvFilter;

/// Route log output to stderr so transcripts on stdout stay clean
///
/// Log level is Debug in development builds and Info in production builds;
/// `--verbose` forces Debug and `RUST_LOG` overrides both. Dependencies only
/// log warnings unless `RUST_LOG` says otherwise.
pub fn init(verbose: bool) {
    let level = if verbose || cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,scribe={level},scribe_lib={level},scribe_client={level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
