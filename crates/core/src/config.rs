//! Client configuration.
//!
//! Values come from built-in defaults, then a JSON file or the environment,
//! then explicit overrides applied by the host (CLI flags).

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use qc_protocol::Modality;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::detect::DetectionMode;
use crate::error::{ClientError, Result};

/// Fixed API prefix appended to the base URL.
pub const API_PREFIX: &str = "/api/v1";

/// Transport timeout. Long enough for slow inference calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment variable holding the service origin.
pub const ENV_BASE_URL: &str = "QC_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "QC_TIMEOUT_MS";
/// Puts every modality onto one detection mode (`real` or `mock`) where that
/// mode has a detector; hemorrhage stays real under `mock`.
pub const ENV_DETECTION_MODE: &str = "QC_DETECTION_MODE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
	/// Service origin, without the `/api/v1` prefix.
	pub base_url: String,
	pub timeout_ms: u64,
	pub detection: DetectionConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
			detection: DetectionConfig::default(),
		}
	}
}

impl ClientConfig {
	/// Builds a config from `QC_*` environment variables over the defaults.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Same as [`from_env`](Self::from_env) with an injectable variable source.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let mut config = Self::default();
		if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
			config.base_url = base_url.trim().to_string();
		}
		if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
			config.timeout_ms = raw
				.trim()
				.parse()
				.map_err(|_| ClientError::Config(format!("{ENV_TIMEOUT_MS} must be a number of milliseconds, got {raw:?}")))?;
		}
		if let Some(raw) = lookup(ENV_DETECTION_MODE) {
			config.detection.default_mode = Some(raw.parse().map_err(ClientError::Config)?);
		}
		config.validate()?;
		Ok(config)
	}

	/// Loads a JSON config file. Missing keys keep their defaults.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| ClientError::Config(format!("failed to read {}: {e}", path.display())))?;
		let config: Self = serde_json::from_str(&content).map_err(|e| ClientError::Config(format!("failed to parse {}: {e}", path.display())))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		self.api_root()?;
		if self.timeout_ms == 0 {
			return Err(ClientError::Config("timeout must be greater than zero".into()));
		}
		self.detection.validate()
	}

	/// Absolute API root, e.g. `http://localhost:8080/api/v1`.
	pub fn api_root(&self) -> Result<String> {
		let url = Url::parse(self.base_url.trim()).map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(ClientError::Config(format!("base URL must be http(s), got {}", url.scheme())));
		}
		Ok(format!("{}{}", url.as_str().trim_end_matches('/'), API_PREFIX))
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

/// Per-modality choice between the real and the simulated detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionConfig {
	/// Mode for every modality without an explicit override. Modalities the
	/// mode has no detector for keep their built-in mode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_mode: Option<DetectionMode>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub overrides: BTreeMap<Modality, DetectionMode>,
	/// Replaces the simulated latency of mock detectors.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mock_delay_ms: Option<u64>,
}

impl DetectionConfig {
	pub fn mode_for(&self, modality: Modality) -> DetectionMode {
		self.overrides
			.get(&modality)
			.copied()
			.or(self.default_mode.filter(|mode| mode.available_for(modality)))
			.unwrap_or_else(|| DetectionMode::builtin(modality))
	}

	/// Rejects explicit overrides naming a detector that does not exist.
	pub fn validate(&self) -> Result<()> {
		match self.overrides.iter().find(|(modality, mode)| !mode.available_for(**modality)) {
			Some((modality, mode)) => Err(ClientError::Config(format!("no {mode} detector for {}", modality.slug()))),
			None => Ok(()),
		}
	}
}
