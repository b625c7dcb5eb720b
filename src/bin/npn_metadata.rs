//! Publishes the USA-NPN metadata workbooks.
//!
//! Takes no arguments. Settings come from `$NPN_METADATA_CONFIG` or
//! `./config.toml`; log verbosity from `RUST_LOG` (default `info`).

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use npn_metadata::{publish, Settings};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = Settings::locate();
    let settings = match Settings::load(&config_path) {
        Ok(s) => s,
        Err(e) => {
            error!(config = %config_path.display(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    match publish(&settings) {
        Ok(report) => {
            info!(
                files = report.files.len(),
                version = npn_metadata::version(),
                "metadata workbooks published"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
