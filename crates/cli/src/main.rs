//! `qc`: command-line host for the QC client.
//!
//! Boots the client the way the web frontend does (navigation bound before
//! anything renders), runs one operation or an NDJSON batch, and prints a JSON
//! result envelope per operation. Logs go to stderr.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	logging::init(cli.verbose);

	match commands::dispatch(cli).await {
		Ok(true) => ExitCode::SUCCESS,
		Ok(false) => ExitCode::FAILURE,
		Err(err) => {
			error!(target: "qc.cli", error = %err, "command failed");
			output::print_error_stderr(&err.to_command_error());
			ExitCode::from(2)
		}
	}
}
