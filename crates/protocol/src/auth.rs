//! Session endpoint payloads (`/auth/*`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authenticated identity as reported by `/auth/login` and `/auth/current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub username: String,
	#[serde(rename = "fullName", alias = "full_name", default, skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
}

impl Identity {
	/// Name suitable for display, preferring the full name.
	pub fn display_name(&self) -> &str {
		self.full_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.username)
	}
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl Credentials {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials").field("username", &self.username).field("password", &"<redacted>").finish()
	}
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
	pub username: String,
	pub password: String,
	pub email: String,
	#[serde(alias = "fullName")]
	pub full_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hospital: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub department: Option<String>,
}

impl fmt::Debug for Registration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registration")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("email", &self.email)
			.field("full_name", &self.full_name)
			.field("hospital", &self.hospital)
			.field("department", &self.department)
			.finish()
	}
}

/// Generic `{ "message": ... }` / `{ "detail": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}
