mod common;

use std::sync::Arc;

use common::{FakeServer, PASSWORD, SLOW_TREND, closed_port_url};
use parking_lot::Mutex;
use qc::session::MemorySessionStore;
use qc::transport::{RequestMeta, ResponseInterceptor};
use qc::{App, AuthState, ClientConfig, ClientError, SessionStore};
use qc_protocol::{Credentials, Registration};

/// Records each failure together with the session state observed at that point.
#[derive(Debug)]
struct FailureLog {
	store: Arc<MemorySessionStore>,
	seen: Mutex<Vec<(String, AuthState)>>,
}

impl ResponseInterceptor for FailureLog {
	fn on_error(&self, request: &RequestMeta, _error: &ClientError) {
		self.seen.lock().push((request.to_string(), self.store.get().authenticated));
	}
}

#[tokio::test]
async fn slow_response_times_out_without_touching_session() {
	let server = FakeServer::spawn().await;
	let config = ClientConfig {
		timeout_ms: (SLOW_TREND.as_millis() / 5) as u64,
		..server.config()
	};
	let app = App::builder(config).start().unwrap();
	app.auth().login(&Credentials::new("doctor", PASSWORD)).await.unwrap();

	let err = app.summary().trend(None).await.unwrap_err();
	assert!(err.is_timeout(), "expected timeout, got {err:?}");
	assert!(app.session().is_authenticated());
	assert_eq!(app.router().pending(), None);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
	let config = ClientConfig {
		base_url: closed_port_url().await,
		..ClientConfig::default()
	};
	let app = App::builder(config).start().unwrap();

	let err = app.summary().distribution().await.unwrap_err();
	assert!(matches!(err, ClientError::Network(_)), "expected network error, got {err:?}");
	assert_eq!(app.session().authenticated, AuthState::Unknown);
	assert_eq!(app.router().pending(), None);
}

#[tokio::test]
async fn bad_credentials_surface_server_detail() {
	let server = FakeServer::spawn().await;
	let app = App::builder(server.config()).start().unwrap();

	let err = app.auth().login(&Credentials::new("doctor", "wrong")).await.unwrap_err();
	match err {
		ClientError::HttpStatus { code, detail } => {
			assert_eq!(code, 400);
			assert_eq!(detail.as_deref(), Some("用户名或密码错误"));
		}
		other => panic!("expected HTTP status error, got {other:?}"),
	}
	assert_eq!(app.session().authenticated, AuthState::Unknown);
	assert_eq!(app.router().pending(), None);
}

#[tokio::test]
async fn server_error_keeps_plain_text_detail() {
	let server = FakeServer::spawn().await;
	let app = App::builder(server.config()).start().unwrap();
	app.auth().login(&Credentials::new("doctor", PASSWORD)).await.unwrap();

	server.set_unavailable(true);
	let err = app.summary().stats().await.unwrap_err();
	assert_eq!(err.status(), Some(503));
	assert_eq!(err.to_string(), "server returned status 503: maintenance window");
	assert!(app.session().is_authenticated());

	server.set_unavailable(false);
	let stats = app.summary().stats().await.unwrap();
	assert_eq!(stats.pending_issues, 23);
}

#[tokio::test]
async fn public_endpoint_needs_no_session() {
	let server = FakeServer::spawn().await;
	let app = App::builder(server.config()).start().unwrap();

	let slices = app.summary().distribution().await.unwrap();
	assert_eq!(slices.len(), 2);
	assert_eq!(slices[0].name, "运动伪影");
}

#[tokio::test]
async fn invalid_registration_never_reaches_server() {
	let server = FakeServer::spawn().await;
	let app = App::builder(server.config()).start().unwrap();

	let registration = Registration {
		username: "newdoc".into(),
		password: "pw".into(),
		email: "not-an-address".into(),
		full_name: "新医生".into(),
		hospital: None,
		department: None,
	};
	let err = app.auth().register(&registration).await.unwrap_err();
	assert!(matches!(err, ClientError::Validation(_)));
	assert_eq!(server.register_calls(), 0);

	let registration = Registration {
		email: "newdoc@hospital.cn".into(),
		..registration
	};
	let reply = app.auth().register(&registration).await.unwrap();
	assert_eq!(reply.message.as_deref(), Some("注册成功"));
	assert_eq!(server.register_calls(), 1);
	assert_eq!(app.session().authenticated, AuthState::Unknown);
}

#[tokio::test]
async fn custom_interceptors_run_after_session_recovery() {
	let server = FakeServer::spawn().await;
	let store = Arc::new(MemorySessionStore::new());
	let log = Arc::new(FailureLog {
		store: store.clone(),
		seen: Mutex::new(Vec::new()),
	});
	let app = App::builder(server.config()).store(store).response_interceptor(log.clone()).start().unwrap();
	app.auth().login(&Credentials::new("doctor", PASSWORD)).await.unwrap();

	server.expire();
	assert!(app.quality().hemorrhage_history(None).await.unwrap_err().is_auth_lost());

	let seen = log.seen.lock().clone();
	assert_eq!(seen, vec![("GET /quality/hemorrhage/history".to_string(), AuthState::Unauthenticated)]);
}
