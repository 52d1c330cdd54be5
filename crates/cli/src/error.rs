use qc::ClientError;
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Client(#[from] ClientError),

	#[error("invalid batch request: {0}")]
	BadRequest(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl CliError {
	pub fn to_command_error(&self) -> CommandError {
		match self {
			CliError::Client(err) => CommandError::from(err),
			CliError::BadRequest(message) => CommandError {
				code: ErrorCode::InvalidInput,
				message: message.clone(),
				details: None,
			},
			CliError::Io(err) => CommandError {
				code: ErrorCode::IoError,
				message: err.to_string(),
				details: None,
			},
			CliError::Json(err) => CommandError {
				code: ErrorCode::InternalError,
				message: err.to_string(),
				details: None,
			},
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
