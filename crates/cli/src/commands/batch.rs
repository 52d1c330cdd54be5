//! NDJSON batch mode.
//!
//! Each stdin line is `{"id": ..., "command": "<name>", "args": {...}}`; each
//! produces one result line on stdout carrying the same `id`. All lines share
//! one [`App`], so one login serves the whole batch. `quit` or end of input
//! stops the loop.

use qc::App;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::Op;
use crate::error::{CliError, Result};
use crate::output::{CommandResult, ErrorCode, OutputFormat, ResultBuilder, print_result};

const QUIT: &str = "quit";

#[derive(Debug, PartialEq)]
enum BatchLine {
	Quit { id: Option<String> },
	Op { id: Option<String>, op: Op },
}

pub(crate) async fn run_batch(app: &App) -> Result<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		if line.trim().is_empty() {
			continue;
		}
		match parse_line(&line) {
			Ok(BatchLine::Quit { id }) => {
				let result = ResultBuilder::new(QUIT).id(id).data(Value::Null).build();
				print_result(&result, OutputFormat::Ndjson);
				break;
			}
			Ok(BatchLine::Op { id, op }) => {
				debug!(target: "qc.cli", id = ?id, command = op.name(), "batch request");
				let result = super::run_one(app, op, id).await.build();
				print_result(&result, OutputFormat::Ndjson);
			}
			Err((id, command, err)) => {
				let result: CommandResult<Value> = ResultBuilder::new(command).id(id).error(ErrorCode::InvalidInput, err.to_string()).build();
				print_result(&result, OutputFormat::Ndjson);
			}
		}
	}
	Ok(())
}

type LineError = (Option<String>, String, CliError);

fn parse_line(line: &str) -> std::result::Result<BatchLine, LineError> {
	let mut value: Value = serde_json::from_str(line).map_err(|e| (None, "batch".to_string(), CliError::BadRequest(e.to_string())))?;
	let Some(request) = value.as_object_mut() else {
		return Err((None, "batch".to_string(), CliError::BadRequest("request must be a JSON object".into())));
	};

	let id = request.remove("id").and_then(|id| match id {
		Value::String(s) => Some(s),
		Value::Null => None,
		other => Some(other.to_string()),
	});
	let command = request.get("command").and_then(Value::as_str).unwrap_or("batch").to_string();
	if command == QUIT {
		return Ok(BatchLine::Quit { id });
	}
	let empty_args = request.get("args").is_some_and(|args| args.as_object().is_some_and(|m| m.is_empty()));

	let parsed = serde_json::from_value::<Op>(value.clone()).or_else(|err| {
		// Unit operations take no content, so `"args": {}` is retried without it.
		if !empty_args {
			return Err(err);
		}
		if let Some(request) = value.as_object_mut() {
			request.remove("args");
		}
		serde_json::from_value::<Op>(value)
	});
	match parsed {
		Ok(op) => Ok(BatchLine::Op { id, op }),
		Err(e) => Err((id, command, CliError::BadRequest(e.to_string()))),
	}
}
