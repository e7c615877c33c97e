//! `generate`: build the hundo CP curve store from main-series base stats.
//!
//! Reads the `generate` section of the config file. Exit codes: 1 input missing,
//! 2 input malformed, 3 output not writable.

use std::error::Error;
use std::process::ExitCode;

use hundo::{generate, Config};

fn main() -> ExitCode {
    hundo::init_tracing();

    let config = match Config::try_load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err:#}");
            return ExitCode::from(2);
        }
    };

    match generate::run(&config) {
        Ok(generated) => {
            tracing::info!(
                "Done: {} curves, {} skipped",
                generated.records.len(),
                generated.skipped.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut message = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            tracing::error!("{message}");
            ExitCode::from(err.exit_code())
        }
    }
}
