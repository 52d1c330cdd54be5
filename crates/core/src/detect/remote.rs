//! Server-side detection over the shared transport.

use std::sync::Arc;

use async_trait::async_trait;
use qc_protocol::{DetectionReport, Modality};
use reqwest::multipart::{Form, Part};
use tracing::info;

use super::{DetectionService, ScanUpload};
use crate::error::Result;
use crate::transport::{ApiRequest, TransportClient};

/// Uploads the scan as multipart form data to the modality's endpoint.
///
/// Goes through [`TransportClient`], so an expired session during upload
/// triggers the same recovery as any other call.
#[derive(Debug, Clone)]
pub struct RemoteDetection {
	transport: Arc<TransportClient>,
}

impl RemoteDetection {
	pub fn new(transport: Arc<TransportClient>) -> Self {
		Self { transport }
	}
}

fn upload_form(upload: &ScanUpload) -> Form {
	let mut form = Form::new().part("file", Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone()));
	if let Some(name) = &upload.patient_name {
		form = form.text("patient_name", name.clone());
	}
	if let Some(exam_id) = &upload.exam_id {
		form = form.text("exam_id", exam_id.clone());
	}
	form
}

#[async_trait]
impl DetectionService for RemoteDetection {
	async fn detect(&self, modality: Modality, upload: &ScanUpload) -> Result<DetectionReport> {
		let request = ApiRequest::post(modality.endpoint()).multipart(upload_form(upload));
		let report: DetectionReport = self.transport.send(request).await?;
		info!(
			target: "qc.detect",
			%modality,
			file = %upload.file_name,
			size = upload.bytes.len(),
			duration_ms = report.duration,
			failures = report.failures().count(),
			"detection finished"
		);
		Ok(report)
	}
}
