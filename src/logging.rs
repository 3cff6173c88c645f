use tracing_subscriber::EnvFilter;

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,chat2sql=debug"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
