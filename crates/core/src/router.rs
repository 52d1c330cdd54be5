//! Route table and the navigation subsystem.
//!
//! Transitions are requested in two ways: directly through [`Router::navigate`]
//! (user navigation), or through a [`RouterHandle`] held by the transport,
//! which queues a single pending destination that [`Router::settle`] drains.
//! Every transition runs the [`NavigationGuard`] before it is committed.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use qc_protocol::Modality;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::guard::{GuardDecision, NavigationGuard};
use crate::navigation::Navigator;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Upper bound on redirects followed for one transition.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
	Public,
	Protected,
}

/// Page rendered for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
	Login,
	Register,
	Dashboard,
	Quality(Modality),
	Issues,
}

impl fmt::Display for View {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			View::Login => f.write_str("login"),
			View::Register => f.write_str("register"),
			View::Dashboard => f.write_str("dashboard"),
			View::Quality(modality) => write!(f, "quality/{modality}"),
			View::Issues => f.write_str("issues"),
		}
	}
}

/// What a route resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
	View(View),
	/// Static alias to another path.
	Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
	pub path: &'static str,
	pub access: AccessClass,
	pub target: RouteTarget,
}

impl RouteDescriptor {
	const fn public(path: &'static str, view: View) -> Self {
		Self {
			path,
			access: AccessClass::Public,
			target: RouteTarget::View(view),
		}
	}

	const fn protected(path: &'static str, view: View) -> Self {
		Self {
			path,
			access: AccessClass::Protected,
			target: RouteTarget::View(view),
		}
	}
}

/// Route after static redirects have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoute {
	pub path: &'static str,
	pub access: AccessClass,
	pub view: View,
}

/// Immutable route table, built once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
	routes: Vec<RouteDescriptor>,
	/// Destination for paths matching no route.
	not_found: &'static str,
}

impl RouteTable {
	/// Routes of the QC application.
	pub fn standard() -> Self {
		let mut routes = vec![
			RouteDescriptor::public(LOGIN_PATH, View::Login),
			RouteDescriptor::public(REGISTER_PATH, View::Register),
			RouteDescriptor {
				path: HOME_PATH,
				access: AccessClass::Protected,
				target: RouteTarget::Redirect(DASHBOARD_PATH),
			},
			RouteDescriptor::protected(DASHBOARD_PATH, View::Dashboard),
		];
		routes.extend(Modality::ALL.into_iter().map(|m| RouteDescriptor::protected(quality_path(m), View::Quality(m))));
		routes.push(RouteDescriptor::protected("/issues", View::Issues));
		Self {
			routes,
			not_found: DASHBOARD_PATH,
		}
	}

	pub fn routes(&self) -> &[RouteDescriptor] {
		&self.routes
	}

	pub fn lookup(&self, path: &str) -> Option<&RouteDescriptor> {
		let path = normalize_path(path);
		self.routes.iter().find(|route| route.path == path)
	}

	/// Resolves `path` to a view route, following static redirects.
	pub fn resolve(&self, path: &str) -> Result<ResolvedRoute> {
		let mut current = normalize_path(path);
		for _ in 0..=MAX_REDIRECTS {
			let Some(route) = self.routes.iter().find(|route| route.path == current) else {
				current = self.not_found.to_string();
				continue;
			};
			match route.target {
				RouteTarget::View(view) => {
					return Ok(ResolvedRoute {
						path: route.path,
						access: route.access,
						view,
					});
				}
				RouteTarget::Redirect(next) => current = next.to_string(),
			}
		}
		Err(ClientError::RedirectLoop {
			path: path.to_string(),
			hops: MAX_REDIRECTS,
		})
	}
}

fn quality_path(modality: Modality) -> &'static str {
	match modality {
		Modality::Head => "/head",
		Modality::ChestNonContrast => "/chest-non-contrast",
		Modality::ChestContrast => "/chest-contrast",
		Modality::CoronaryCta => "/coronary-cta",
		Modality::Hemorrhage => "/hemorrhage",
	}
}

/// Strips query, fragment and trailing slashes; ensures a leading slash.
fn normalize_path(path: &str) -> String {
	let path = path.split(['?', '#']).next().unwrap_or_default().trim();
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		return HOME_PATH.to_string();
	}
	if trimmed.starts_with('/') {
		trimmed.to_string()
	} else {
		format!("/{trimmed}")
	}
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
	/// Path the caller asked for.
	pub requested: String,
	/// Path actually rendered.
	pub path: String,
	pub view: View,
}

impl Navigation {
	pub fn redirected(&self) -> bool {
		self.requested != self.path
	}
}

#[derive(Debug, Default)]
struct Location {
	current: Option<String>,
	pending: Option<String>,
	history: Vec<String>,
}

/// Navigator given to the transport. Queues at most one pending destination.
#[derive(Debug, Clone, Default)]
pub struct RouterHandle {
	location: Arc<Mutex<Location>>,
}

impl RouterHandle {
	pub fn pending(&self) -> Option<String> {
		self.location.lock().pending.clone()
	}

	fn take_pending(&self) -> Option<String> {
		self.location.lock().pending.take()
	}

	fn commit(&self, path: &str) {
		let mut location = self.location.lock();
		if location.pending.as_deref() == Some(path) {
			location.pending = None;
		}
		location.current = Some(path.to_string());
		location.history.push(path.to_string());
	}
}

impl Navigator for RouterHandle {
	fn push(&self, path: &str) -> bool {
		let mut location = self.location.lock();
		if location.current.as_deref() == Some(path) || location.pending.as_deref() == Some(path) {
			return false;
		}
		location.pending = Some(path.to_string());
		debug!(target: "qc.router", %path, "transition queued");
		true
	}
}

/// The navigation subsystem.
///
/// Constructed only by [`App`](crate::App), which binds its handle into the
/// transport before exposing it.
pub struct Router {
	table: RouteTable,
	guard: NavigationGuard,
	handle: RouterHandle,
}

impl Router {
	pub(crate) fn new(table: RouteTable, guard: NavigationGuard) -> Self {
		Self {
			table,
			guard,
			handle: RouterHandle::default(),
		}
	}

	pub fn handle(&self) -> RouterHandle {
		self.handle.clone()
	}

	pub fn table(&self) -> &RouteTable {
		&self.table
	}

	/// Path currently rendered, if any transition has completed.
	pub fn current(&self) -> Option<String> {
		self.handle.location.lock().current.clone()
	}

	/// Committed paths in order.
	pub fn history(&self) -> Vec<String> {
		self.handle.location.lock().history.clone()
	}

	pub fn pending(&self) -> Option<String> {
		self.handle.pending()
	}

	/// Runs the guard for `path`, following redirects, and commits the result.
	pub async fn navigate(&self, path: &str) -> Result<Navigation> {
		let requested = normalize_path(path);
		let mut target = requested.clone();
		for _ in 0..=MAX_REDIRECTS {
			let route = self.table.resolve(&target)?;
			match self.guard.check(route.access).await {
				GuardDecision::Allow => {
					self.handle.commit(route.path);
					info!(target: "qc.router", requested = %requested, path = route.path, view = %route.view, "navigated");
					return Ok(Navigation {
						requested,
						path: route.path.to_string(),
						view: route.view,
					});
				}
				GuardDecision::Redirect(next) => {
					debug!(target: "qc.router", from = route.path, to = next, "guard redirected");
					target = next.to_string();
				}
			}
		}
		Err(ClientError::RedirectLoop {
			path: requested,
			hops: MAX_REDIRECTS,
		})
	}

	/// Performs queued transitions until none remain. Returns the last one.
	pub async fn settle(&self) -> Result<Option<Navigation>> {
		let mut last = None;
		while let Some(path) = self.handle.take_pending() {
			last = Some(self.navigate(&path).await?);
		}
		Ok(last)
	}
}
