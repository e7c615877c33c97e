//! Hundo CP checker: offline curve generation and online screenshot checks.

pub mod check;
pub mod config;
pub mod generate;
pub mod util;

pub use check::{CheckError, Checker, Report, Verdict};
pub use config::Config;

/// Structured logging to stderr. Use `RUST_LOG=debug` etc.; defaults to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
