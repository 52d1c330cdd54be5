//! Application wiring.
//!
//! [`AppBuilder::start`] builds the transport, the API facades and the router,
//! then binds the router's navigation handle into the transport. Nothing that
//! can issue a request or a transition escapes before the binding exists.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use qc_protocol::{DetectionReport, Modality};
use tracing::info;

use crate::api::{AuthApi, QualityApi, SummaryApi};
use crate::config::ClientConfig;
use crate::detect::{DetectionService, DetectionServices, MockDetection, RemoteDetection, ScanUpload};
use crate::error::Result;
use crate::guard::NavigationGuard;
use crate::navigation::PageReload;
use crate::router::{Navigation, RouteTable, Router};
use crate::session::{MemorySessionStore, SessionState, SessionStore};
use crate::transport::{ResponseInterceptor, TransportClient};

pub struct AppBuilder {
	config: ClientConfig,
	store: Option<Arc<dyn SessionStore>>,
	detectors: HashMap<Modality, Arc<dyn DetectionService>>,
	response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl AppBuilder {
	/// Session cache to use. Defaults to an in-memory store.
	pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
		self.store = Some(store);
		self
	}

	/// Routes detection for `modality` to `service`, ignoring the configured mode.
	pub fn detection_service(mut self, modality: Modality, service: Arc<dyn DetectionService>) -> Self {
		self.detectors.insert(modality, service);
		self
	}

	/// Extra observer of failed requests, run after session recovery.
	pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
		self.response_interceptors.push(interceptor);
		self
	}

	pub fn start(self) -> Result<App> {
		self.config.validate()?;
		let store = self.store.unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
		let page_reload = Arc::new(PageReload::new());

		let mut builder = TransportClient::builder(&self.config, store.clone()).fallback(page_reload.clone());
		for interceptor in self.response_interceptors {
			builder = builder.response_interceptor(interceptor);
		}
		let transport = Arc::new(builder.build()?);

		let auth = AuthApi::new(transport.clone());
		let guard = NavigationGuard::new(store, Arc::new(auth.clone()));
		let router = Router::new(RouteTable::standard(), guard);
		transport.bind_navigation(Arc::new(router.handle()))?;

		let real: Arc<dyn DetectionService> = Arc::new(RemoteDetection::new(transport.clone()));
		let mock: Arc<dyn DetectionService> = Arc::new(MockDetection::new(self.config.detection.mock_delay_ms));
		let detection = self
			.detectors
			.into_iter()
			.fold(DetectionServices::new(self.config.detection.clone(), real, mock), |services, (modality, service)| {
				services.with_override(modality, service)
			});

		info!(target: "qc.app", api_root = %transport.api_root(), "client started");
		Ok(App {
			quality: QualityApi::new(transport.clone()),
			summary: SummaryApi::new(transport.clone()),
			auth,
			transport,
			router,
			detection,
			page_reload,
		})
	}
}

/// A started client: transport, router and API facades sharing one session.
pub struct App {
	transport: Arc<TransportClient>,
	router: Router,
	auth: AuthApi,
	quality: QualityApi,
	summary: SummaryApi,
	detection: DetectionServices,
	page_reload: Arc<PageReload>,
}

impl App {
	pub fn builder(config: ClientConfig) -> AppBuilder {
		AppBuilder {
			config,
			store: None,
			detectors: HashMap::new(),
			response_interceptors: Vec::new(),
		}
	}

	/// Requests a transition to `path` through the guard.
	pub async fn navigate(&self, path: &str) -> Result<Navigation> {
		self.router.navigate(path).await
	}

	/// Performs transitions queued by session recovery.
	pub async fn settle(&self) -> Result<Option<Navigation>> {
		self.router.settle().await
	}

	pub fn session(&self) -> SessionState {
		self.transport.store().get()
	}

	pub fn auth(&self) -> &AuthApi {
		&self.auth
	}

	pub fn quality(&self) -> &QualityApi {
		&self.quality
	}

	pub fn summary(&self) -> &SummaryApi {
		&self.summary
	}

	pub fn detection(&self) -> &DetectionServices {
		&self.detection
	}

	pub async fn detect(&self, modality: Modality, upload: &ScanUpload) -> Result<DetectionReport> {
		self.detection.detect(modality, upload).await
	}

	pub fn router(&self) -> &Router {
		&self.router
	}

	pub fn transport(&self) -> &Arc<TransportClient> {
		&self.transport
	}

	/// Navigator the transport falls back to when unbound.
	pub fn page_reload(&self) -> &PageReload {
		&self.page_reload
	}
}

impl fmt::Debug for App {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("App")
			.field("transport", &self.transport)
			.field("current", &self.router.current())
			.field("session", &self.session())
			.finish_non_exhaustive()
	}
}
