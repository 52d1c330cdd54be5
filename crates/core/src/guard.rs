//! Pre-transition access check.
//!
//! The guard trusts the cached session hint and only asks the server when the
//! hint is unknown. A stale "authenticated" hint is caught later by the
//! transport's `401` recovery on the next API call.

use std::sync::Arc;

use async_trait::async_trait;
use qc_protocol::Identity;
use tracing::{debug, info};

use crate::error::Result;
use crate::router::{AccessClass, HOME_PATH, LOGIN_PATH};
use crate::session::{AuthState, SessionState, SessionStore};

/// Server round trip confirming the current session.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
	async fn verify(&self) -> Result<Identity>;
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
	Allow,
	Redirect(&'static str),
}

pub struct NavigationGuard {
	store: Arc<dyn SessionStore>,
	verifier: Arc<dyn SessionVerifier>,
}

impl NavigationGuard {
	pub fn new(store: Arc<dyn SessionStore>, verifier: Arc<dyn SessionVerifier>) -> Self {
		Self { store, verifier }
	}

	/// Decides whether a transition to a route of class `access` may proceed.
	///
	/// | access | hint | outcome |
	/// |---|---|---|
	/// | Public | authenticated | redirect home |
	/// | Public | otherwise | allow |
	/// | Protected | authenticated | allow |
	/// | Protected | unauthenticated | redirect login |
	/// | Protected | unknown | verify, then allow or redirect login |
	pub async fn check(&self, access: AccessClass) -> GuardDecision {
		let state = self.store.get().authenticated;
		match (access, state) {
			(AccessClass::Public, AuthState::Authenticated) => GuardDecision::Redirect(HOME_PATH),
			(AccessClass::Public, _) => GuardDecision::Allow,
			(AccessClass::Protected, AuthState::Authenticated) => GuardDecision::Allow,
			(AccessClass::Protected, AuthState::Unauthenticated) => GuardDecision::Redirect(LOGIN_PATH),
			(AccessClass::Protected, AuthState::Unknown) => self.verify().await,
		}
	}

	async fn verify(&self) -> GuardDecision {
		debug!(target: "qc.router", "session hint unknown; verifying with server");
		match self.verifier.verify().await {
			Ok(identity) => {
				info!(target: "qc.session", user = %identity.username, "existing server session confirmed");
				self.store.set(SessionState::authenticated(identity));
				GuardDecision::Allow
			}
			Err(err) => {
				debug!(target: "qc.session", error = %err, "session verification failed");
				self.store.set(SessionState::unauthenticated());
				GuardDecision::Redirect(LOGIN_PATH)
			}
		}
	}
}
