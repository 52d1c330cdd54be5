use qc::{AuthState, ClientError};
use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	/// Batch request id, echoed back.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session: Option<SessionSummary>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<EffectiveConfig>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	AuthLost,
	NetworkError,
	Timeout,
	HttpError,
	InvalidInput,
	DecodeError,
	NavigationFailed,
	ConfigError,
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::AuthLost => write!(f, "AUTH_LOST"),
			ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::HttpError => write!(f, "HTTP_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
			ErrorCode::NavigationFailed => write!(f, "NAVIGATION_FAILED"),
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

impl From<&ClientError> for CommandError {
	fn from(err: &ClientError) -> Self {
		let (code, details) = match err {
			ClientError::AuthLost => (ErrorCode::AuthLost, Some(serde_json::json!({ "status": 401 }))),
			ClientError::Network(_) => (ErrorCode::NetworkError, None),
			ClientError::Timeout { timeout_ms } => (ErrorCode::Timeout, Some(serde_json::json!({ "timeoutMs": timeout_ms }))),
			ClientError::HttpStatus { code, detail } => (ErrorCode::HttpError, Some(serde_json::json!({ "status": code, "detail": detail }))),
			ClientError::Validation(_) => (ErrorCode::InvalidInput, None),
			ClientError::Decode(_) | ClientError::Json(_) => (ErrorCode::DecodeError, None),
			ClientError::RedirectLoop { path, hops } => (ErrorCode::NavigationFailed, Some(serde_json::json!({ "path": path, "hops": hops }))),
			ClientError::Config(_) => (ErrorCode::ConfigError, None),
			ClientError::Io(_) => (ErrorCode::IoError, None),
			ClientError::AlreadyBound => (ErrorCode::InternalError, None),
		};
		Self {
			code,
			message: err.to_string(),
			details,
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Warning,
	Error,
}

/// Client-side session view after the command, including any redirect it caused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
	pub state: AuthState,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
}

/// Effective configuration used for command execution.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub api_root: String,
	pub timeout_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state_file: Option<std::path::PathBuf>,
}
