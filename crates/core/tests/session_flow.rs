mod common;

use std::sync::Arc;

use common::{FakeServer, PASSWORD};
use qc::detect::ScanUpload;
use qc::navigation::PageReload;
use qc::router::{DASHBOARD_PATH, View};
use qc::session::{FileSessionStore, MemorySessionStore};
use qc::transport::{ApiRequest, TransportClient};
use qc::{App, AuthState, ClientError, LOGIN_PATH, SessionState, SessionStore};
use qc_protocol::{Credentials, Identity, IssueStatus, Modality};

async fn logged_in(server: &FakeServer) -> App {
	let app = App::builder(server.config()).start().expect("app should start");
	app.auth().login(&Credentials::new("doctor", PASSWORD)).await.expect("login should succeed");
	app
}

#[tokio::test]
async fn login_then_protected_route_skips_verification() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let session = app.session();
	assert_eq!(session.authenticated, AuthState::Authenticated);
	assert_eq!(session.profile.as_ref().map(Identity::display_name), Some("王医生"));

	let nav = app.navigate("/hemorrhage").await.unwrap();
	assert_eq!(nav.view, View::Quality(Modality::Hemorrhage));
	assert_eq!(server.current_calls(), 0);
}

#[tokio::test]
async fn expired_session_redirects_to_login_once() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;
	app.navigate("/hemorrhage").await.unwrap();

	server.expire();
	let err = app.quality().hemorrhage_history(None).await.unwrap_err();
	assert!(err.is_auth_lost());
	assert_eq!(app.session().authenticated, AuthState::Unauthenticated);
	assert_eq!(app.session().profile, None);
	assert_eq!(app.router().pending().as_deref(), Some(LOGIN_PATH));

	let nav = app.settle().await.unwrap().expect("login transition should run");
	assert_eq!(nav.path, LOGIN_PATH);
	assert_eq!(app.router().history(), vec!["/hemorrhage".to_string(), LOGIN_PATH.to_string()]);
	assert_eq!(server.current_calls(), 0);

	// Protected routes now go straight to login without asking the server.
	let nav = app.navigate("/issues").await.unwrap();
	assert_eq!(nav.path, LOGIN_PATH);
	assert_eq!(server.current_calls(), 0);
}

#[tokio::test]
async fn concurrent_auth_failures_produce_one_redirect() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;
	app.navigate("/dashboard").await.unwrap();

	server.expire();
	let recent_query = Default::default();
	let (history, stats, recent) = futures::join!(
		app.quality().hemorrhage_history(Some(5)),
		app.summary().stats(),
		app.summary().recent(&recent_query),
	);
	assert!(history.unwrap_err().is_auth_lost());
	assert!(stats.unwrap_err().is_auth_lost());
	assert!(recent.unwrap_err().is_auth_lost());

	app.settle().await.unwrap();
	let logins = app.router().history().iter().filter(|p| p.as_str() == LOGIN_PATH).count();
	assert_eq!(logins, 1);
	assert_eq!(app.router().current().as_deref(), Some(LOGIN_PATH));
	assert_eq!(app.router().pending(), None);
}

#[tokio::test]
async fn unknown_hint_with_live_session_verifies_once() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;
	app.transport().store().set(SessionState::default());

	let nav = app.navigate("/dashboard").await.unwrap();
	assert_eq!(nav.path, DASHBOARD_PATH);
	assert_eq!(server.current_calls(), 1);
	assert!(app.session().is_authenticated());

	app.navigate("/issues").await.unwrap();
	assert_eq!(server.current_calls(), 1);
}

#[tokio::test]
async fn unknown_hint_without_session_lands_on_login() {
	let server = FakeServer::spawn().await;
	let app = App::builder(server.config()).start().unwrap();

	let nav = app.navigate("/dashboard").await.unwrap();
	assert!(nav.redirected());
	assert_eq!(nav.requested, DASHBOARD_PATH);
	assert_eq!(nav.path, LOGIN_PATH);
	assert_eq!(nav.view, View::Login);
	assert_eq!(app.session().authenticated, AuthState::Unauthenticated);
	assert_eq!(server.current_calls(), 1);

	app.navigate("/coronary-cta").await.unwrap();
	assert_eq!(server.current_calls(), 1);
}

#[tokio::test]
async fn public_route_while_authenticated_goes_to_dashboard() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let nav = app.navigate(LOGIN_PATH).await.unwrap();
	assert_eq!(nav.path, DASHBOARD_PATH);
	let nav = app.navigate("/register").await.unwrap();
	assert_eq!(nav.path, DASHBOARD_PATH);
}

#[tokio::test]
async fn unknown_path_falls_back_to_dashboard() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let nav = app.navigate("/no/such/page").await.unwrap();
	assert_eq!(nav.path, DASHBOARD_PATH);
	assert_eq!(nav.view, View::Dashboard);
}

#[tokio::test]
async fn auth_lost_before_binding_reloads_login_page() {
	let server = FakeServer::spawn().await;
	let store = Arc::new(MemorySessionStore::new());
	let reload = Arc::new(PageReload::new());
	let transport = TransportClient::builder(&server.config(), store.clone()).fallback(reload.clone()).build().unwrap();

	for _ in 0..2 {
		let err = transport.send::<Identity>(ApiRequest::get("/auth/current")).await.unwrap_err();
		assert!(matches!(err, ClientError::AuthLost));
	}
	assert_eq!(store.get().authenticated, AuthState::Unauthenticated);
	assert_eq!(reload.requested().as_deref(), Some(LOGIN_PATH));
	assert_eq!(reload.reload_count(), 1);
}

#[tokio::test]
async fn logout_clears_hint() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	app.auth().logout().await.unwrap();
	assert_eq!(app.session().authenticated, AuthState::Unauthenticated);

	let nav = app.navigate("/dashboard").await.unwrap();
	assert_eq!(nav.path, LOGIN_PATH);
	assert_eq!(server.current_calls(), 0);
}

#[tokio::test]
async fn hemorrhage_detection_uploads_scan_and_metadata() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let upload = ScanUpload::new("brain.dcm", vec![7; 64]).with_patient_name("张三").with_exam_id("EXAM-1001");
	let report = app.detect(Modality::Hemorrhage, &upload).await.unwrap();
	assert_eq!(report.duration, 950);
	assert_eq!(report.issues[0].status, IssueStatus::Fail);
	assert_eq!(report.extra.get("prediction").and_then(|v| v.as_str()), Some("Hemorrhage"));

	let received = server.last_upload().expect("server should record the upload");
	assert_eq!(received.file_name.as_deref(), Some("brain.dcm"));
	assert_eq!(received.size, 64);
	assert_eq!(received.patient_name.as_deref(), Some("张三"));
	assert_eq!(received.exam_id.as_deref(), Some("EXAM-1001"));
}

#[tokio::test]
async fn detection_after_session_loss_sends_client_to_login() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;
	let nav = app.navigate("/dashboard").await.unwrap();
	assert_eq!(nav.path, DASHBOARD_PATH);
	assert_eq!(server.current_calls(), 0);

	server.expire();
	let upload = ScanUpload::new("brain.dcm", vec![7; 32]).with_exam_id("EXAM-2002");
	let err = app.detect(Modality::Hemorrhage, &upload).await.unwrap_err();
	assert!(err.is_auth_lost());
	assert_eq!(server.detect_calls(), 1);
	assert_eq!(app.session().authenticated, AuthState::Unauthenticated);
	assert_eq!(app.session().profile, None);

	let nav = app.settle().await.unwrap().expect("login transition should run");
	assert_eq!(nav.path, LOGIN_PATH);
	assert_eq!(app.router().history(), vec![DASHBOARD_PATH.to_string(), LOGIN_PATH.to_string()]);
	assert_eq!(server.current_calls(), 0);
}

#[tokio::test]
async fn verification_racing_failed_calls_lands_on_login_once() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;
	app.navigate("/dashboard").await.unwrap();
	app.transport().store().set(SessionState::default());
	server.expire();

	let upload = ScanUpload::new("brain.dcm", vec![7; 16]);
	let (nav, history, report) = futures::join!(
		app.navigate("/issues"),
		app.quality().hemorrhage_history(None),
		app.detect(Modality::Hemorrhage, &upload),
	);
	assert_eq!(nav.unwrap().path, LOGIN_PATH);
	assert!(history.unwrap_err().is_auth_lost());
	assert!(report.unwrap_err().is_auth_lost());
	assert_eq!(server.current_calls(), 1);

	app.settle().await.unwrap();
	assert_eq!(app.router().history(), vec![DASHBOARD_PATH.to_string(), LOGIN_PATH.to_string()]);
	assert_eq!(app.router().pending(), None);
	assert_eq!(app.session().authenticated, AuthState::Unauthenticated);
}

#[tokio::test]
async fn empty_upload_is_rejected_locally() {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let err = app.detect(Modality::Hemorrhage, &ScanUpload::new("brain.dcm", Vec::new())).await.unwrap_err();
	assert!(matches!(err, ClientError::Validation(_)));
	assert_eq!(server.detect_calls(), 0);
	assert!(app.session().is_authenticated());
}

#[tokio::test]
async fn hemorrhage_history_respects_limit() -> anyhow::Result<()> {
	let server = FakeServer::spawn().await;
	let app = logged_in(&server).await;

	let history = app.quality().hemorrhage_history(Some(2)).await?;
	assert_eq!(history.data.len(), 2);
	assert_eq!(server.history_calls(), 1);

	let stats = app.summary().stats().await?;
	assert_eq!(stats.total_scans, 12580);
	let trend = app.summary().trend(Some(2)).await?;
	assert_eq!(trend.issues, vec![4, 1]);
	Ok(())
}

#[tokio::test]
async fn persisted_session_survives_restart() -> anyhow::Result<()> {
	let server = FakeServer::spawn().await;
	let tmp = tempfile::TempDir::new()?;
	let path = tmp.path().join("session.json");

	let first = App::builder(server.config()).store(Arc::new(FileSessionStore::open(&path))).start()?;
	first.auth().login(&Credentials::new("doctor", PASSWORD)).await?;
	drop(first);

	let second = App::builder(server.config()).store(Arc::new(FileSessionStore::open(&path))).start()?;
	assert!(second.session().is_authenticated());
	let nav = second.navigate("/hemorrhage").await?;
	assert_eq!(nav.path, "/hemorrhage");
	let history = second.quality().hemorrhage_history(Some(1)).await?;
	assert_eq!(history.data.len(), 1);
	assert_eq!(server.current_calls(), 0);
	Ok(())
}
