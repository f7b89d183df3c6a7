//! Diagnostic logging for the CLI.
//!
//! Diagnostics go to stderr through `tracing` so they never mix with the
//! rendered response on stdout. Initialisation is best-effort: a filter that
//! fails to parse falls back to the default, and a subscriber that is already
//! installed (as happens when tests drive the runtime repeatedly) is left in
//! place.

use std::io::{self, IsTerminal};

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use meshctl_config::{Config, LogFormat, default_log_filter};

pub(crate) fn init(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter)
        .or_else(|_| EnvFilter::try_new(default_log_filter()))
        .unwrap_or_default();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    let _ = tracing::subscriber::set_global_default(subscriber);
}
