use std::process::ExitCode;

use geminibot::error::Result;
use log::{error, info};

const DEFAULT_LOG_FILTER: &str = "geminibot=info,serenity=warn";

/// Exit status for a startup problem that a restart alone cannot fix.
const CONFIG_EXIT: u8 = 2;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .init();
}

fn exit_code(outcome: &Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => {
            info!("geminibot stopped");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_retryable() => {
            error!("geminibot stopped after a runtime failure: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("geminibot cannot start: {e}");
            ExitCode::from(CONFIG_EXIT)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    info!("geminibot {} starting", env!("CARGO_PKG_VERSION"));

    exit_code(&geminibot::run().await)
}
