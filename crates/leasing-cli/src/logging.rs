use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
///
/// stdout is reserved for command output so it can be piped into other tools.
pub fn initialize(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "leasing_core=debug,info",
        _ => "trace",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
