//! Client-side session cache.
//!
//! [`SessionState`] is a hint mirroring whether the server probably holds an
//! authenticated session for this client. It may be stale in both directions,
//! so it is never treated as authoritative: the navigation guard verifies it
//! when it is unknown, and the transport corrects it on every `401`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use qc_protocol::Identity;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cookies::CookieJar;

/// Tri-state authentication hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
	/// Nothing known yet (fresh client, or hint lost on restart).
	#[default]
	Unknown,
	Authenticated,
	Unauthenticated,
}

impl fmt::Display for AuthState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuthState::Unknown => f.write_str("unknown"),
			AuthState::Authenticated => f.write_str("authenticated"),
			AuthState::Unauthenticated => f.write_str("unauthenticated"),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	pub authenticated: AuthState,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub profile: Option<Identity>,
}

impl SessionState {
	pub fn authenticated(profile: Identity) -> Self {
		Self {
			authenticated: AuthState::Authenticated,
			profile: Some(profile),
		}
	}

	pub fn unauthenticated() -> Self {
		Self {
			authenticated: AuthState::Unauthenticated,
			profile: None,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.authenticated == AuthState::Authenticated
	}
}

/// Synchronous access to the session hint.
///
/// Every read and write of the hint goes through this trait so hosts and
/// tests can substitute the backing storage.
pub trait SessionStore: Send + Sync + fmt::Debug {
	fn get(&self) -> SessionState;

	fn set(&self, state: SessionState);

	/// Marks the session unauthenticated and drops the cached profile.
	///
	/// Returns `false` when the store was already cleared, which makes
	/// repeated clears observable as a single transition.
	fn clear(&self) -> bool;

	/// Jar the transport should use for the session cookie.
	///
	/// `None` keeps cookies in the HTTP client for its lifetime only.
	fn cookie_jar(&self) -> Option<Arc<CookieJar>> {
		None
	}
}

/// In-memory store living as long as the client.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
	state: Mutex<SessionState>,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_state(state: SessionState) -> Self {
		Self { state: Mutex::new(state) }
	}
}

impl SessionStore for MemorySessionStore {
	fn get(&self) -> SessionState {
		self.state.lock().clone()
	}

	fn set(&self, state: SessionState) {
		*self.state.lock() = state;
	}

	fn clear(&self) -> bool {
		let mut state = self.state.lock();
		let cleared = SessionState::unauthenticated();
		if *state == cleared {
			return false;
		}
		*state = cleared;
		true
	}
}

/// Store that persists the authenticated hint to a JSON file.
///
/// Only an authenticated hint is written; any other state removes the file,
/// so a restarted client starts from either `Authenticated` (possibly stale)
/// or `Unknown`. The session cookie is kept in a sibling file
/// (`session.json` -> `session.cookies.json`) so the hint and the credential
/// it describes survive a restart together. Write failures are logged and
/// never fail the caller.
#[derive(Debug)]
pub struct FileSessionStore {
	path: PathBuf,
	state: Mutex<SessionState>,
	cookies: Arc<CookieJar>,
}

impl FileSessionStore {
	/// Opens the store, loading any persisted hint.
	pub fn open(path: impl Into<PathBuf>) -> Self {
		let path = path.into();
		let state = load_hint(&path);
		debug!(target: "qc.session", path = %path.display(), state = %state.authenticated, "loaded session hint");
		let cookies = Arc::new(CookieJar::persistent(path.with_extension("cookies.json")));
		Self {
			path,
			state: Mutex::new(state),
			cookies,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn cookies(&self) -> &Arc<CookieJar> {
		&self.cookies
	}

	fn persist(&self, state: &SessionState) {
		let outcome = if state.is_authenticated() {
			write_hint(&self.path, state)
		} else {
			match std::fs::remove_file(&self.path) {
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
				other => other,
			}
		};
		if let Err(err) = outcome {
			warn!(target: "qc.session", path = %self.path.display(), error = %err, "failed to persist session hint");
		}
	}
}

impl SessionStore for FileSessionStore {
	fn get(&self) -> SessionState {
		self.state.lock().clone()
	}

	fn set(&self, state: SessionState) {
		let mut current = self.state.lock();
		self.persist(&state);
		*current = state;
	}

	fn clear(&self) -> bool {
		let mut current = self.state.lock();
		let cleared = SessionState::unauthenticated();
		if *current == cleared {
			return false;
		}
		self.persist(&cleared);
		*current = cleared;
		true
	}

	fn cookie_jar(&self) -> Option<Arc<CookieJar>> {
		Some(self.cookies.clone())
	}
}

fn load_hint(path: &Path) -> SessionState {
	let Ok(content) = std::fs::read_to_string(path) else {
		return SessionState::default();
	};
	match serde_json::from_str::<SessionState>(&content) {
		Ok(state) if state.is_authenticated() => state,
		Ok(_) => SessionState::default(),
		Err(err) => {
			warn!(target: "qc.session", path = %path.display(), error = %err, "ignoring unreadable session hint");
			SessionState::default()
		}
	}
}

fn write_hint(path: &Path, state: &SessionState) -> std::io::Result<()> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			std::fs::create_dir_all(parent)?;
		}
	}
	let json = serde_json::to_string_pretty(state)?;
	std::fs::write(path, json)
}
