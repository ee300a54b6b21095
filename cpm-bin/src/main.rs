use color_eyre::eyre;
use cpm_sdk::CpmClient;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use output::Envelope;

// Usage: cpm_serial_port_action_info [ARGS_FILE]
//
// Without ARGS_FILE the parameters come from CPM_* environment variables.
// stdout carries only the JSON result; logs go to stderr.
#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<ExitCode> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args_file = std::env::args_os().nth(1).map(PathBuf::from);
    info!(args_file = ?args_file, "Starting cpm_serial_port_action_info");

    let envelope = match config::load_params(args_file.as_deref()).and_then(CpmClient::new) {
        Ok(client) => output::run_module(&client).await,
        Err(err) => Envelope::from(err),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", envelope.to_json()?)?;
    stdout.flush()?;

    Ok(ExitCode::from(envelope.exit_code()))
}
