//! Session-gated client for the medical imaging QC service.
//!
//! The crate coordinates two layers that depend on each other:
//!
//! - [`transport::TransportClient`] sends every API call, unwraps payloads and
//!   classifies failures. A `401` is [`ClientError::AuthLost`]: the session
//!   cache is cleared and the client is sent to the login route.
//! - [`router::Router`] gates each route transition through a
//!   [`guard::NavigationGuard`] that trusts the cached session hint and only
//!   asks the server when the hint is unknown.
//!
//! The transport learns about the router through a one-shot
//! [`navigation::NavigationBinding`]; [`App::builder`] performs the binding
//! before handing out anything that can navigate.
//!
//! ```no_run
//! # use qc::{App, ClientConfig};
//! # use qc_protocol::Credentials;
//! # async fn demo() -> qc::Result<()> {
//! let app = App::builder(ClientConfig::from_env()?).start()?;
//! app.auth().login(&Credentials::new("doctor", "secret")).await?;
//! let nav = app.navigate("/dashboard").await?;
//! assert_eq!(nav.path, "/dashboard");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod cookies;
pub mod detect;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod router;
pub mod session;
pub mod transport;

pub use app::{App, AppBuilder};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use router::{HOME_PATH, LOGIN_PATH, Navigation};
pub use session::{AuthState, SessionState, SessionStore};
