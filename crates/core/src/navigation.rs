//! Late binding between the transport and the navigation subsystem.
//!
//! The router needs the transport to verify sessions, and the transport needs
//! the router to redirect on session loss. The transport therefore holds a
//! [`NavigationBinding`] that is filled exactly once during startup; until
//! then it falls back to a full-page reload.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Capability to request a page transition.
///
/// Implementations must be idempotent for repeated requests to the same
/// destination: asking for a route that is already current or already
/// pending is a no-op reported as `false`.
pub trait Navigator: Send + Sync {
	fn push(&self, path: &str) -> bool;
}

/// One-shot slot for the client-side navigation handle.
#[derive(Default)]
pub struct NavigationBinding {
	handle: OnceLock<Arc<dyn Navigator>>,
}

impl NavigationBinding {
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs the handle. Fails with [`ClientError::AlreadyBound`] on any call after the first.
	pub fn bind(&self, handle: Arc<dyn Navigator>) -> Result<()> {
		self.handle.set(handle).map_err(|_| ClientError::AlreadyBound)?;
		debug!(target: "qc.router", "navigation handle bound");
		Ok(())
	}

	pub fn is_bound(&self) -> bool {
		self.handle.get().is_some()
	}

	pub fn get(&self) -> Option<&Arc<dyn Navigator>> {
		self.handle.get()
	}
}

impl fmt::Debug for NavigationBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NavigationBinding").field("bound", &self.is_bound()).finish()
	}
}

/// Full-page navigation used while no client-side handle is bound.
///
/// A reload discards all client state, so the requested location is recorded
/// for the host to act on; repeated requests for the same location collapse
/// into one.
#[derive(Debug, Default)]
pub struct PageReload {
	location: Mutex<Option<String>>,
	reloads: AtomicUsize,
}

impl PageReload {
	pub fn new() -> Self {
		Self::default()
	}

	/// Location of the pending reload, if any.
	pub fn requested(&self) -> Option<String> {
		self.location.lock().clone()
	}

	/// Takes the pending reload location, leaving none.
	pub fn take(&self) -> Option<String> {
		self.location.lock().take()
	}

	/// Number of distinct reloads requested so far.
	pub fn reload_count(&self) -> usize {
		self.reloads.load(Ordering::SeqCst)
	}
}

impl Navigator for PageReload {
	fn push(&self, path: &str) -> bool {
		let mut location = self.location.lock();
		if location.as_deref() == Some(path) {
			return false;
		}
		*location = Some(path.to_string());
		self.reloads.fetch_add(1, Ordering::SeqCst);
		warn!(target: "qc.router", %path, "no client-side navigation bound; falling back to full page load");
		true
	}
}
