//! Structured JSON logging setup using tracing.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with JSON output.
///
/// `RUST_LOG` takes precedence over the provided `filter` directive
/// (e.g. `"info,gatehouse=debug"`).
///
/// # Errors
///
/// Returns the parse error for an invalid filter directive, whether it
/// came from `RUST_LOG` or from `filter`; same fail-fast contract as
/// configuration loading.
///
/// # Panics
///
/// Panics if the subscriber has already been initialized.
pub fn init_logging(filter: &str) -> Result<(), ParseError> {
    let filter_layer = build_filter(std::env::var("RUST_LOG").ok(), filter)?;

    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    tracing::info!(filter = %filter, "Logging initialized");
    Ok(())
}

fn build_filter(env_directives: Option<String>, fallback: &str) -> Result<EnvFilter, ParseError> {
    match env_directives {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_new(fallback),
    }
}
