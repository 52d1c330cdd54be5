//! Cookie jar holding the server session credential.
//!
//! [`CookieJar`] plugs into reqwest as its cookie provider. A persistent jar
//! writes every change to a JSON file and reloads it on open, so a restarted
//! client still sends the session cookie the server issued at login.
//!
//! Cookies are scoped to the exact host that set them; `Domain` attributes are
//! not widened to subdomains.

use std::path::{Path, PathBuf};

use cookie::Cookie;
use cookie::time::{Duration, OffsetDateTime};
use parking_lot::Mutex;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// One stored `name=value` pair and its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
	pub host: String,
	pub path: String,
	pub name: String,
	pub value: String,
}

impl StoredCookie {
	fn matches(&self, host: &str, request_path: &str) -> bool {
		self.host == host && path_matches(&self.path, request_path)
	}
}

#[derive(Debug, Default)]
pub struct CookieJar {
	cookies: Mutex<Vec<StoredCookie>>,
	file: Option<PathBuf>,
}

impl CookieJar {
	/// Jar living as long as the client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Jar backed by `file`, loading whatever an earlier run stored there.
	pub fn persistent(file: impl Into<PathBuf>) -> Self {
		let file = file.into();
		let cookies = load_cookies(&file);
		debug!(target: "qc.session", path = %file.display(), count = cookies.len(), "loaded cookie jar");
		Self {
			cookies: Mutex::new(cookies),
			file: Some(file),
		}
	}

	pub fn file(&self) -> Option<&Path> {
		self.file.as_deref()
	}

	/// Value of cookie `name` set by `host`, if any.
	pub fn get(&self, host: &str, name: &str) -> Option<String> {
		self.cookies.lock().iter().find(|c| c.host == host && c.name == name).map(|c| c.value.clone())
	}

	pub fn len(&self) -> usize {
		self.cookies.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.cookies.lock().is_empty()
	}

	/// Records one `Set-Cookie` value received from `host`. Returns whether the jar changed.
	fn apply(cookies: &mut Vec<StoredCookie>, host: &str, raw: &str) -> bool {
		let cookie = match Cookie::parse(raw) {
			Ok(cookie) => cookie,
			Err(err) => {
				debug!(target: "qc.session", %host, error = %err, "ignoring malformed Set-Cookie");
				return false;
			}
		};
		let path = cookie.path().filter(|p| p.starts_with('/')).unwrap_or("/").to_string();
		let before = cookies.len();
		cookies.retain(|c| !(c.host == host && c.path == path && c.name == cookie.name()));
		if is_expired(&cookie) {
			return cookies.len() != before;
		}
		cookies.push(StoredCookie {
			host: host.to_string(),
			path,
			name: cookie.name().to_string(),
			value: cookie.value().to_string(),
		});
		true
	}

	fn persist(&self, cookies: &[StoredCookie]) {
		let Some(file) = &self.file else {
			return;
		};
		if let Err(err) = write_cookies(file, cookies) {
			warn!(target: "qc.session", path = %file.display(), error = %err, "failed to persist cookie jar");
		}
	}
}

impl CookieStore for CookieJar {
	fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
		let Some(host) = url.host_str() else {
			return;
		};
		let mut cookies = self.cookies.lock();
		let mut changed = false;
		for header in cookie_headers {
			if let Ok(raw) = header.to_str() {
				changed |= Self::apply(&mut cookies, host, raw);
			}
		}
		if changed {
			self.persist(&cookies);
		}
	}

	fn cookies(&self, url: &Url) -> Option<HeaderValue> {
		let host = url.host_str()?;
		let header = self
			.cookies
			.lock()
			.iter()
			.filter(|c| c.matches(host, url.path()))
			.map(|c| format!("{}={}", c.name, c.value))
			.collect::<Vec<_>>()
			.join("; ");
		if header.is_empty() {
			return None;
		}
		HeaderValue::from_str(&header).ok()
	}
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
	cookie.max_age().is_some_and(|age| age <= Duration::ZERO) || cookie.expires_datetime().is_some_and(|at| at <= OffsetDateTime::now_utc())
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
	if cookie_path == "/" || cookie_path == request_path {
		return true;
	}
	request_path.starts_with(cookie_path) && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

fn load_cookies(file: &Path) -> Vec<StoredCookie> {
	let Ok(content) = std::fs::read_to_string(file) else {
		return Vec::new();
	};
	serde_json::from_str(&content).unwrap_or_else(|err| {
		warn!(target: "qc.session", path = %file.display(), error = %err, "ignoring unreadable cookie jar");
		Vec::new()
	})
}

fn write_cookies(file: &Path, cookies: &[StoredCookie]) -> std::io::Result<()> {
	if cookies.is_empty() {
		return match std::fs::remove_file(file) {
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			other => other,
		};
	}
	if let Some(parent) = file.parent() {
		if !parent.as_os_str().is_empty() {
			std::fs::create_dir_all(parent)?;
		}
	}
	std::fs::write(file, serde_json::to_string_pretty(cookies)?)
}
