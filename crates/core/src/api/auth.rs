//! Session endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use qc_protocol::{Credentials, Identity, Registration, ServerMessage};
use tracing::info;

use crate::error::{ClientError, Result};
use crate::guard::SessionVerifier;
use crate::session::SessionState;
use crate::transport::{ApiRequest, TransportClient};

#[derive(Debug, Clone)]
pub struct AuthApi {
	transport: Arc<TransportClient>,
}

impl AuthApi {
	pub fn new(transport: Arc<TransportClient>) -> Self {
		Self { transport }
	}

	/// `POST /auth/login`. On success the session hint becomes authenticated.
	pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
		require("username", &credentials.username)?;
		require("password", &credentials.password)?;

		let identity: Identity = self.transport.send(ApiRequest::post("/auth/login").json(credentials)?).await?;
		self.transport.store().set(SessionState::authenticated(identity.clone()));
		info!(target: "qc.session", user = %identity.username, "logged in");
		Ok(identity)
	}

	/// `POST /auth/logout`.
	///
	/// The hint is marked unauthenticated whether or not the server call
	/// succeeds; the server error, if any, is still returned.
	pub async fn logout(&self) -> Result<ServerMessage> {
		let outcome = self.transport.send(ApiRequest::post("/auth/logout")).await;
		self.transport.store().set(SessionState::unauthenticated());
		info!(target: "qc.session", "logged out");
		outcome
	}

	/// `GET /auth/current`: the identity bound to the server session.
	pub async fn current(&self) -> Result<Identity> {
		self.transport.send(ApiRequest::get("/auth/current")).await
	}

	/// `POST /auth/register`. Does not log in.
	pub async fn register(&self, registration: &Registration) -> Result<ServerMessage> {
		require("username", &registration.username)?;
		require("password", &registration.password)?;
		require("email", &registration.email)?;
		if !registration.email.contains('@') {
			return Err(ClientError::Validation(format!("email {:?} is not an address", registration.email)));
		}
		self.transport.send(ApiRequest::post("/auth/register").json(registration)?).await
	}
}

#[async_trait]
impl SessionVerifier for AuthApi {
	async fn verify(&self) -> Result<Identity> {
		self.current().await
	}
}

fn require(field: &str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(ClientError::Validation(format!("{field} is required")));
	}
	Ok(())
}
