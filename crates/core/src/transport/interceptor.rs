//! Request- and response-phase interceptors.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::navigation::{NavigationBinding, Navigator};
use crate::router::LOGIN_PATH;
use crate::session::SessionStore;

/// Identity of a request as seen by response interceptors.
#[derive(Debug, Clone)]
pub struct RequestMeta {
	pub method: Method,
	pub path: String,
}

impl fmt::Display for RequestMeta {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.method, self.path)
	}
}

/// Hook run on every outgoing request before it is sent.
pub trait RequestInterceptor: Send + Sync {
	fn on_request(&self, request: &mut reqwest::Request) -> Result<()>;
}

/// Hook run on every failed call, after classification.
pub trait ResponseInterceptor: Send + Sync {
	fn on_error(&self, request: &RequestMeta, error: &ClientError);
}

/// Logs each outgoing request at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLog;

impl RequestInterceptor for RequestLog {
	fn on_request(&self, request: &mut reqwest::Request) -> Result<()> {
		debug!(target: "qc.transport", method = %request.method(), url = %request.url(), "sending request");
		Ok(())
	}
}

/// Session-loss recovery: on [`ClientError::AuthLost`], clear the session
/// cache, then send the client to the login route.
///
/// Both steps are idempotent, so concurrent failures collapse into one
/// observable clear and one redirect without any locking here.
pub struct AuthRecovery {
	store: Arc<dyn SessionStore>,
	binding: Arc<NavigationBinding>,
	fallback: Arc<dyn Navigator>,
}

impl AuthRecovery {
	pub fn new(store: Arc<dyn SessionStore>, binding: Arc<NavigationBinding>, fallback: Arc<dyn Navigator>) -> Self {
		Self { store, binding, fallback }
	}
}

impl ResponseInterceptor for AuthRecovery {
	fn on_error(&self, request: &RequestMeta, error: &ClientError) {
		if !error.is_auth_lost() {
			debug!(target: "qc.transport", %request, error = %error, "request failed");
			return;
		}

		let cleared = self.store.clear();
		let redirected = match self.binding.get() {
			Some(router) => router.push(LOGIN_PATH),
			None => self.fallback.push(LOGIN_PATH),
		};

		if cleared || redirected {
			info!(target: "qc.session", %request, cleared, redirected, "session lost; returning to login");
		} else {
			debug!(target: "qc.session", %request, "session already cleared; recovery skipped");
		}
	}
}
