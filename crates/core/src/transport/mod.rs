//! HTTP transport for the QC API.
//!
//! Every call goes through [`TransportClient::send`], which:
//!
//! 1. Builds the request against `<base>/api/v1` with the fixed timeout
//! 2. Runs the request interceptor chain
//! 3. Sends it with the client's cookie jar (the server session cookie is the
//!    only credential; no authorization header is ever attached)
//! 4. Unwraps a 2xx body into the caller's payload type
//! 5. Classifies failures and runs the response interceptor chain, which
//!    includes [`AuthRecovery`] for `401`
//!
//! # Failure classification
//!
//! | Condition | Error |
//! |---|---|
//! | timeout elapsed | [`ClientError::Timeout`] |
//! | no response (connect/reset/DNS) | [`ClientError::Network`] |
//! | status 401 | [`ClientError::AuthLost`] |
//! | other non-2xx | [`ClientError::HttpStatus`] |
//! | 2xx body not matching the payload | [`ClientError::Decode`] |

mod interceptor;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use self::interceptor::{AuthRecovery, RequestInterceptor, RequestLog, RequestMeta, ResponseInterceptor};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::navigation::{NavigationBinding, Navigator, PageReload};
use crate::session::SessionStore;

/// Longest server text carried into an error detail.
const MAX_DETAIL_LEN: usize = 200;

/// Body of an outgoing API request.
#[derive(Debug, Default)]
pub enum RequestBody {
	#[default]
	Empty,
	Json(Value),
	Multipart(Form),
}

/// Method, path, query and body of one API call. `path` is relative to the API root.
#[derive(Debug)]
pub struct ApiRequest {
	pub method: Method,
	pub path: String,
	pub query: Vec<(String, String)>,
	pub body: RequestBody,
}

impl ApiRequest {
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: RequestBody::Empty,
		}
	}

	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Serializes `body` as the JSON request body.
	pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
		self.body = RequestBody::Json(serde_json::to_value(body)?);
		Ok(self)
	}

	pub fn multipart(mut self, form: Form) -> Self {
		self.body = RequestBody::Multipart(form);
		self
	}

	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));
		self
	}

	/// Appends every field of a serializable struct as query parameters, skipping nulls.
	pub fn query_struct(mut self, params: &impl Serialize) -> Result<Self> {
		if let Value::Object(map) = serde_json::to_value(params)? {
			for (key, value) in map {
				match value {
					Value::Null => {}
					Value::String(s) => self.query.push((key, s)),
					other => self.query.push((key, other.to_string())),
				}
			}
		}
		Ok(self)
	}
}

/// Configured HTTP client shared by every API facade.
pub struct TransportClient {
	http: reqwest::Client,
	api_root: String,
	timeout: Duration,
	store: Arc<dyn SessionStore>,
	binding: Arc<NavigationBinding>,
	request_chain: Vec<Arc<dyn RequestInterceptor>>,
	response_chain: Vec<Arc<dyn ResponseInterceptor>>,
}

impl TransportClient {
	pub fn builder(config: &ClientConfig, store: Arc<dyn SessionStore>) -> TransportBuilder {
		TransportBuilder {
			config: config.clone(),
			store,
			fallback: None,
			request_chain: vec![Arc::new(RequestLog)],
			response_chain: Vec::new(),
		}
	}

	/// Installs the client-side navigation handle. Callable once.
	pub fn bind_navigation(&self, handle: Arc<dyn Navigator>) -> Result<()> {
		self.binding.bind(handle)
	}

	pub fn is_navigation_bound(&self) -> bool {
		self.binding.is_bound()
	}

	pub fn store(&self) -> &Arc<dyn SessionStore> {
		&self.store
	}

	pub fn api_root(&self) -> &str {
		&self.api_root
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Sends `request` and decodes the response payload.
	///
	/// Failures pass through the response interceptors before being returned,
	/// so an [`ClientError::AuthLost`] has already cleared the session cache
	/// and requested the login redirect when the caller sees it.
	pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
		let meta = RequestMeta {
			method: request.method.clone(),
			path: request.path.clone(),
		};
		let outcome = self.execute(request).await;
		if let Err(err) = &outcome {
			for interceptor in &self.response_chain {
				interceptor.on_error(&meta, err);
			}
		}
		outcome
	}

	async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
		let url = format!("{}{}", self.api_root, request.path);
		let mut builder = self.http.request(request.method, &url);
		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		builder = match request.body {
			RequestBody::Empty => builder,
			RequestBody::Json(value) => builder.json(&value),
			RequestBody::Multipart(form) => builder.multipart(form),
		};

		let mut http_request = builder.build().map_err(|e| ClientError::Validation(format!("cannot build request for {url}: {e}")))?;
		for interceptor in &self.request_chain {
			interceptor.on_request(&mut http_request)?;
		}

		let response = self.http.execute(http_request).await.map_err(|e| self.classify_transport_error(e))?;
		let status = response.status();
		debug!(target: "qc.transport", %url, status = status.as_u16(), "response received");

		if !status.is_success() {
			let body = response.bytes().await.unwrap_or_default();
			return Err(classify_status(status.as_u16(), &body));
		}
		let body = response.bytes().await.map_err(|e| self.classify_transport_error(e))?;
		decode_payload(&body)
	}

	fn classify_transport_error(&self, err: reqwest::Error) -> ClientError {
		if err.is_timeout() {
			ClientError::Timeout {
				timeout_ms: self.timeout.as_millis() as u64,
			}
		} else {
			ClientError::Network(error_chain(&err))
		}
	}
}

impl fmt::Debug for TransportClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TransportClient")
			.field("api_root", &self.api_root)
			.field("timeout", &self.timeout)
			.field("navigation", &self.binding)
			.finish_non_exhaustive()
	}
}

/// Builder for [`TransportClient`].
pub struct TransportBuilder {
	config: ClientConfig,
	store: Arc<dyn SessionStore>,
	fallback: Option<Arc<dyn Navigator>>,
	request_chain: Vec<Arc<dyn RequestInterceptor>>,
	response_chain: Vec<Arc<dyn ResponseInterceptor>>,
}

impl TransportBuilder {
	/// Navigator used for the login redirect while no handle is bound.
	/// Defaults to a fresh [`PageReload`].
	pub fn fallback(mut self, fallback: Arc<dyn Navigator>) -> Self {
		self.fallback = Some(fallback);
		self
	}

	pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
		self.request_chain.push(interceptor);
		self
	}

	/// Adds a response interceptor. It runs after the built-in [`AuthRecovery`].
	pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
		self.response_chain.push(interceptor);
		self
	}

	pub fn build(self) -> Result<TransportClient> {
		let api_root = self.config.api_root()?;
		let timeout = self.config.timeout();
		let http = reqwest::Client::builder().timeout(timeout);
		let http = match self.store.cookie_jar() {
			Some(jar) => http.cookie_provider(jar),
			None => http.cookie_store(true),
		};
		let http = http
			.build()
			.map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

		let binding = Arc::new(NavigationBinding::new());
		let fallback = self.fallback.unwrap_or_else(|| Arc::new(PageReload::new()));
		let recovery: Arc<dyn ResponseInterceptor> = Arc::new(AuthRecovery::new(self.store.clone(), binding.clone(), fallback));
		let mut response_chain = vec![recovery];
		response_chain.extend(self.response_chain);

		debug!(target: "qc.transport", %api_root, timeout_ms = timeout.as_millis() as u64, "transport configured");
		Ok(TransportClient {
			http,
			api_root,
			timeout,
			store: self.store,
			binding,
			request_chain: self.request_chain,
			response_chain,
		})
	}
}

/// Maps a non-2xx status to the error taxonomy.
fn classify_status(code: u16, body: &[u8]) -> ClientError {
	if code == 401 {
		return ClientError::AuthLost;
	}
	ClientError::HttpStatus {
		code,
		detail: extract_detail(body),
	}
}

/// Pulls a human-readable reason out of an error body.
///
/// The backend answers `{"detail": ...}`; `message`/`error` are accepted too,
/// and short plain-text bodies are passed through.
fn extract_detail(body: &[u8]) -> Option<String> {
	if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
		return ["detail", "message", "error"]
			.iter()
			.find_map(|key| map.get(*key).and_then(Value::as_str))
			.map(str::to_string);
	}
	let text = String::from_utf8_lossy(body);
	let text = text.trim();
	if text.is_empty() {
		return None;
	}
	Some(text.chars().take(MAX_DETAIL_LEN).collect())
}

fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
	let decoded = if body.iter().all(u8::is_ascii_whitespace) {
		serde_json::from_value(Value::Null)
	} else {
		serde_json::from_slice(body)
	};
	decoded.map_err(|e| ClientError::Decode(e.to_string()))
}

fn error_chain(err: &reqwest::Error) -> String {
	let mut message = err.to_string();
	let mut source = std::error::Error::source(err);
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}
