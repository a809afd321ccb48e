//! Structured logging for the terminal client.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Initialize logging. Log lines go to stderr so they never mix with shell
/// output on stdout.
///
/// The `resume_screen` library logs through the `log` facade; the
/// `tracing-log` bridge enabled by `init()` forwards those records here.
///
/// # Example
///
/// ```no_run
/// rs_client::logging::init();
/// tracing::info!("client starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("logging initialized");
}
