#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use qc::ClientConfig;
use serde::Deserialize;
use serde_json::{Value, json};

pub const PASSWORD: &str = "secret";
pub const SLOW_TREND: Duration = Duration::from_millis(500);

#[derive(Default)]
pub struct ServerState {
	sessions: Mutex<HashSet<String>>,
	next_token: AtomicUsize,
	unavailable: AtomicBool,
	pub current_calls: AtomicUsize,
	pub history_calls: AtomicUsize,
	pub detect_calls: AtomicUsize,
	pub register_calls: AtomicUsize,
	pub last_upload: Mutex<Option<Upload>>,
}

#[derive(Debug, Clone, Default)]
pub struct Upload {
	pub file_name: Option<String>,
	pub size: usize,
	pub patient_name: Option<String>,
	pub exam_id: Option<String>,
}

/// In-process stand-in for the QC backend, session tracked by a `SESSION` cookie.
pub struct FakeServer {
	pub base_url: String,
	pub state: Arc<ServerState>,
}

impl FakeServer {
	pub async fn spawn() -> Self {
		let state = Arc::new(ServerState::default());
		let api = Router::new()
			.route("/auth/login", post(login))
			.route("/auth/logout", post(logout))
			.route("/auth/current", get(current))
			.route("/auth/register", post(register))
			.route("/quality/hemorrhage", post(hemorrhage))
			.route("/quality/hemorrhage/history", get(history))
			.route("/summary/stats", get(stats))
			.route("/summary/trend", get(trend))
			.route("/summary/distribution", get(distribution))
			.route("/summary/recent", get(recent));
		let app = Router::new().nest("/api/v1", api).with_state(state.clone());

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fake server");
		let addr = listener.local_addr().expect("fake server addr");
		tokio::spawn(async move {
			axum::serve(listener, app).await.expect("fake server");
		});
		Self {
			base_url: format!("http://{addr}"),
			state,
		}
	}

	pub fn config(&self) -> ClientConfig {
		ClientConfig {
			base_url: self.base_url.clone(),
			timeout_ms: 5_000,
			..ClientConfig::default()
		}
	}

	/// Drops every server-side session, as after a server restart.
	pub fn expire(&self) {
		self.state.sessions.lock().clear();
	}

	/// Makes `/summary/stats` answer 503.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.state.unavailable.store(unavailable, Ordering::SeqCst);
	}

	pub fn current_calls(&self) -> usize {
		self.state.current_calls.load(Ordering::SeqCst)
	}

	pub fn history_calls(&self) -> usize {
		self.state.history_calls.load(Ordering::SeqCst)
	}

	pub fn detect_calls(&self) -> usize {
		self.state.detect_calls.load(Ordering::SeqCst)
	}

	pub fn register_calls(&self) -> usize {
		self.state.register_calls.load(Ordering::SeqCst)
	}

	pub fn last_upload(&self) -> Option<Upload> {
		self.state.last_upload.lock().clone()
	}
}

/// Address nothing listens on.
pub async fn closed_port_url() -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
	let addr = listener.local_addr().expect("probe addr");
	drop(listener);
	format!("http://{addr}")
}

fn identity() -> Value {
	json!({ "username": "doctor", "fullName": "王医生", "role": "DOCTOR" })
}

fn session_token(headers: &HeaderMap) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(';'))
		.find_map(|pair| pair.trim().strip_prefix("SESSION=").map(str::to_string))
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
	session_token(headers).is_some_and(|token| state.sessions.lock().contains(&token))
}

fn not_authenticated() -> Response {
	(StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Not authenticated" }))).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
	username: String,
	password: String,
}

async fn login(State(state): State<Arc<ServerState>>, Json(body): Json<LoginBody>) -> Response {
	if body.username != "doctor" || body.password != PASSWORD {
		return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "用户名或密码错误" }))).into_response();
	}
	let token = format!("token-{}", state.next_token.fetch_add(1, Ordering::SeqCst));
	state.sessions.lock().insert(token.clone());
	([(SET_COOKIE, format!("SESSION={token}; Path=/; HttpOnly"))], Json(identity())).into_response()
}

async fn logout(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	if let Some(token) = session_token(&headers) {
		state.sessions.lock().remove(&token);
	}
	Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn current(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	state.current_calls.fetch_add(1, Ordering::SeqCst);
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	Json(identity()).into_response()
}

async fn register(State(state): State<Arc<ServerState>>, Json(_body): Json<Value>) -> Response {
	state.register_calls.fetch_add(1, Ordering::SeqCst);
	Json(json!({ "message": "注册成功" })).into_response()
}

async fn hemorrhage(State(state): State<Arc<ServerState>>, headers: HeaderMap, mut multipart: Multipart) -> Response {
	state.detect_calls.fetch_add(1, Ordering::SeqCst);
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	let mut upload = Upload::default();
	while let Ok(Some(field)) = multipart.next_field().await {
		let name = field.name().map(str::to_string);
		match name.as_deref() {
			Some("file") => {
				upload.file_name = field.file_name().map(str::to_string);
				upload.size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
			}
			Some("patient_name") => upload.patient_name = field.text().await.ok(),
			Some("exam_id") => upload.exam_id = field.text().await.ok(),
			_ => {}
		}
	}
	*state.last_upload.lock() = Some(upload);
	Json(json!({
		"issues": [
			{ "item": "脑出血", "status": "不合格" },
			{ "item": "中线偏移", "status": "合格" }
		],
		"duration": 950,
		"prediction": "Hemorrhage",
		"confidence": 0.91
	}))
	.into_response()
}

#[derive(Deserialize)]
struct LimitQuery {
	limit: Option<usize>,
}

async fn history(State(state): State<Arc<ServerState>>, headers: HeaderMap, Query(query): Query<LimitQuery>) -> Response {
	state.history_calls.fetch_add(1, Ordering::SeqCst);
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	let limit = query.limit.unwrap_or(20).min(3);
	let data: Vec<Value> = (0..limit).map(|i| json!({ "id": i + 1, "patientName": format!("患者{}", i + 1) })).collect();
	Json(json!({ "data": data })).into_response()
}

async fn stats(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	if state.unavailable.load(Ordering::SeqCst) {
		return (StatusCode::SERVICE_UNAVAILABLE, "maintenance window").into_response();
	}
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	Json(json!({ "total_scans": 12580, "today_scans": 145, "pending_issues": 23, "quality_score": 98.5 })).into_response()
}

async fn trend(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	tokio::time::sleep(SLOW_TREND).await;
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	Json(json!({ "dates": ["10-01", "10-02"], "issues": [4, 1] })).into_response()
}

async fn distribution() -> Response {
	Json(json!([{ "name": "运动伪影", "value": 5 }, { "name": "金属伪影", "value": 2 }])).into_response()
}

async fn recent(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
	if !authorized(&state, &headers) {
		return not_authenticated();
	}
	Json(json!({ "total": 0, "items": [] })).into_response()
}
