//! Simulated detectors for modalities without a server-side analyzer.

use std::time::Duration;

use async_trait::async_trait;
use qc_protocol::{DetectionReport, IssueStatus, Modality, QcIssue};
use tracing::debug;

use super::{DetectionService, ScanUpload};
use crate::error::{ClientError, Result};

/// Check items, response latency and reported duration of one simulated detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockProfile {
	/// `(item, threshold)`: an item fails when a uniform draw exceeds its threshold.
	pub items: &'static [(&'static str, f64)],
	pub delay_ms: u64,
	pub base_duration_ms: u64,
	pub duration_jitter_ms: u64,
}

const HEAD: MockProfile = MockProfile {
	items: &[("运动伪影", 0.7), ("金属伪影", 0.8), ("FOV过大", 0.6), ("FOV过小", 0.5), ("层厚不当", 0.4)],
	delay_ms: 1200,
	base_duration_ms: 800,
	duration_jitter_ms: 500,
};

const CHEST_NON_CONTRAST: MockProfile = MockProfile {
	items: &[("呼吸伪影", 0.6), ("体外金属", 0.8), ("扫描范围不全", 0.5)],
	delay_ms: 1300,
	base_duration_ms: 900,
	duration_jitter_ms: 400,
};

const CHEST_CONTRAST: MockProfile = MockProfile {
	items: &[("分期错误", 0.7), ("增强时机不当", 0.6), ("FOV过小", 0.4)],
	delay_ms: 1400,
	base_duration_ms: 1000,
	duration_jitter_ms: 600,
};

const CORONARY_CTA: MockProfile = MockProfile {
	items: &[("血管强化不足", 0.5), ("噪声过大", 0.6), ("心电门控失败", 0.7)],
	delay_ms: 1600,
	base_duration_ms: 1200,
	duration_jitter_ms: 800,
};

impl MockProfile {
	pub fn for_modality(modality: Modality) -> Option<&'static MockProfile> {
		match modality {
			Modality::Head => Some(&HEAD),
			Modality::ChestNonContrast => Some(&CHEST_NON_CONTRAST),
			Modality::ChestContrast => Some(&CHEST_CONTRAST),
			Modality::CoronaryCta => Some(&CORONARY_CTA),
			Modality::Hemorrhage => None,
		}
	}

	/// Builds a report from uniform draws in `[0, 1)`: one per item, then one for the duration.
	fn report(&self, mut draw: impl FnMut() -> f64) -> DetectionReport {
		let issues = self
			.items
			.iter()
			.map(|&(item, threshold)| QcIssue {
				item: item.to_string(),
				status: if draw() > threshold { IssueStatus::Fail } else { IssueStatus::Pass },
			})
			.collect();
		let duration = self.base_duration_ms + (draw() * self.duration_jitter_ms as f64) as u64;
		DetectionReport {
			issues,
			duration,
			..Default::default()
		}
	}
}

/// Randomized detector that answers after the profile's latency.
#[derive(Debug, Clone, Default)]
pub struct MockDetection {
	delay: Option<Duration>,
}

impl MockDetection {
	/// Uses each profile's own latency unless `delay_ms` is given.
	pub fn new(delay_ms: Option<u64>) -> Self {
		Self {
			delay: delay_ms.map(Duration::from_millis),
		}
	}

	/// No simulated latency.
	pub fn instant() -> Self {
		Self::new(Some(0))
	}
}

#[async_trait]
impl DetectionService for MockDetection {
	async fn detect(&self, modality: Modality, upload: &ScanUpload) -> Result<DetectionReport> {
		let profile = MockProfile::for_modality(modality).ok_or_else(|| ClientError::Config(format!("no simulated detector for {modality}")))?;
		let report = profile.report(rand::random::<f64>);
		let delay = self.delay.unwrap_or(Duration::from_millis(profile.delay_ms));
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		debug!(
			target: "qc.detect",
			%modality,
			file = %upload.file_name,
			failures = report.failures().count(),
			"simulated detection finished"
		);
		Ok(report)
	}
}
