//! Pluggable detection services.
//!
//! Every detector, real or simulated, returns the same [`DetectionReport`]
//! shape so callers are agnostic to the backing implementation.
//! [`DetectionServices`] picks the implementation per modality from
//! [`DetectionConfig`](crate::config::DetectionConfig).

mod mock;
mod remote;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use qc_protocol::{DetectionReport, Modality};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::mock::{MockDetection, MockProfile};
pub use self::remote::RemoteDetection;
use crate::config::DetectionConfig;
use crate::error::{ClientError, Result};

/// Scan file plus optional metadata submitted for analysis.
#[derive(Clone)]
pub struct ScanUpload {
	pub file_name: String,
	pub bytes: Vec<u8>,
	pub patient_name: Option<String>,
	pub exam_id: Option<String>,
}

impl ScanUpload {
	pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self {
			file_name: file_name.into(),
			bytes,
			patient_name: None,
			exam_id: None,
		}
	}

	/// Reads a scan from disk. A missing file is a validation error.
	pub async fn from_path(path: &Path) -> Result<Self> {
		let bytes = match tokio::fs::read(path).await {
			Ok(bytes) => bytes,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				return Err(ClientError::Validation(format!("scan file {} does not exist", path.display())));
			}
			Err(err) => return Err(err.into()),
		};
		let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "scan".to_string());
		Ok(Self::new(file_name, bytes))
	}

	pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
		self.patient_name = Some(name.into());
		self
	}

	pub fn with_exam_id(mut self, exam_id: impl Into<String>) -> Self {
		self.exam_id = Some(exam_id.into());
		self
	}

	/// Rejects uploads that must not be submitted.
	pub fn validate(&self) -> Result<()> {
		if self.file_name.trim().is_empty() {
			return Err(ClientError::Validation("scan file name is required".into()));
		}
		if self.bytes.is_empty() {
			return Err(ClientError::Validation(format!("scan file {} is empty", self.file_name)));
		}
		Ok(())
	}
}

impl fmt::Debug for ScanUpload {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScanUpload")
			.field("file_name", &self.file_name)
			.field("size", &self.bytes.len())
			.field("patient_name", &self.patient_name)
			.field("exam_id", &self.exam_id)
			.finish()
	}
}

/// A detector for one or more modalities.
#[async_trait]
pub trait DetectionService: Send + Sync {
	async fn detect(&self, modality: Modality, upload: &ScanUpload) -> Result<DetectionReport>;
}

/// Backing implementation selected for a modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
	/// Server-side analysis.
	Real,
	/// Simulated, fixed-latency result.
	Mock,
}

impl DetectionMode {
	/// Mode used when configuration says nothing: only hemorrhage has a real detector.
	pub fn builtin(modality: Modality) -> Self {
		match modality {
			Modality::Hemorrhage => DetectionMode::Real,
			_ => DetectionMode::Mock,
		}
	}

	/// Whether a detector of this kind exists for `modality`.
	pub fn available_for(self, modality: Modality) -> bool {
		match self {
			DetectionMode::Real => true,
			DetectionMode::Mock => MockProfile::for_modality(modality).is_some(),
		}
	}
}

impl FromStr for DetectionMode {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"real" => Ok(DetectionMode::Real),
			"mock" => Ok(DetectionMode::Mock),
			other => Err(format!("unknown detection mode {other:?} (expected real or mock)")),
		}
	}
}

impl fmt::Display for DetectionMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DetectionMode::Real => f.write_str("real"),
			DetectionMode::Mock => f.write_str("mock"),
		}
	}
}

/// Per-modality dispatch between real and simulated detectors.
#[derive(Clone)]
pub struct DetectionServices {
	config: DetectionConfig,
	real: Arc<dyn DetectionService>,
	mock: Arc<dyn DetectionService>,
	overrides: HashMap<Modality, Arc<dyn DetectionService>>,
}

impl DetectionServices {
	pub fn new(config: DetectionConfig, real: Arc<dyn DetectionService>, mock: Arc<dyn DetectionService>) -> Self {
		Self {
			config,
			real,
			mock,
			overrides: HashMap::new(),
		}
	}

	/// Routes `modality` to `service` regardless of configured mode.
	pub fn with_override(mut self, modality: Modality, service: Arc<dyn DetectionService>) -> Self {
		self.overrides.insert(modality, service);
		self
	}

	pub fn mode_for(&self, modality: Modality) -> DetectionMode {
		self.config.mode_for(modality)
	}

	fn service_for(&self, modality: Modality) -> &Arc<dyn DetectionService> {
		if let Some(service) = self.overrides.get(&modality) {
			return service;
		}
		match self.mode_for(modality) {
			DetectionMode::Real => &self.real,
			DetectionMode::Mock => &self.mock,
		}
	}

	/// Validates the upload, then runs the detector for `modality`.
	pub async fn detect(&self, modality: Modality, upload: &ScanUpload) -> Result<DetectionReport> {
		upload.validate()?;
		debug!(target: "qc.detect", %modality, mode = %self.mode_for(modality), file = %upload.file_name, "dispatching detection");
		self.service_for(modality).detect(modality, upload).await
	}
}

impl fmt::Debug for DetectionServices {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DetectionServices")
			.field("config", &self.config)
			.field("overrides", &self.overrides.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
