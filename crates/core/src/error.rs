//! Error types for the QC client.

use thiserror::Error;

/// Failure taxonomy of the client.
///
/// Only [`ClientError::AuthLost`] triggers local recovery (session cache clear
/// plus login redirect); every variant propagates to the caller unchanged.
#[derive(Debug, Error)]
pub enum ClientError {
	/// No response was received.
	#[error("network error: {0}")]
	Network(String),

	/// The request exceeded the transport timeout.
	#[error("request timed out after {timeout_ms} ms")]
	Timeout { timeout_ms: u64 },

	/// The server reported the session as invalid (HTTP 401).
	#[error("session is no longer authenticated")]
	AuthLost,

	/// Any other non-2xx response.
	#[error("server returned status {code}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
	HttpStatus { code: u16, detail: Option<String> },

	/// Caller-supplied input rejected before submission.
	#[error("invalid input: {0}")]
	Validation(String),

	/// A 2xx body that does not match the expected payload.
	#[error("failed to decode response: {0}")]
	Decode(String),

	/// `NavigationBinding::bind` was called a second time.
	#[error("navigation handle is already bound")]
	AlreadyBound,

	/// Guard redirects did not settle on a route.
	#[error("navigation to {path} did not settle after {hops} redirects")]
	RedirectLoop { path: String, hops: usize },

	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl ClientError {
	pub fn is_auth_lost(&self) -> bool {
		matches!(self, ClientError::AuthLost)
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, ClientError::Timeout { .. })
	}

	/// HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			ClientError::AuthLost => Some(401),
			ClientError::HttpStatus { code, .. } => Some(*code),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, ClientError>;
