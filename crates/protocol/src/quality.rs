//! Detection payloads (`/quality/*`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Imaging modality covered by a QC detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
	/// CT head, non-contrast.
	Head,
	/// CT chest, non-contrast.
	ChestNonContrast,
	/// CT chest, contrast-enhanced.
	ChestContrast,
	/// Coronary CT angiography.
	CoronaryCta,
	/// Intracranial hemorrhage detection.
	Hemorrhage,
}

impl Modality {
	pub const ALL: [Modality; 5] = [
		Modality::Head,
		Modality::ChestNonContrast,
		Modality::ChestContrast,
		Modality::CoronaryCta,
		Modality::Hemorrhage,
	];

	/// Kebab-case identifier shared by routes and endpoints.
	pub fn slug(self) -> &'static str {
		match self {
			Modality::Head => "head",
			Modality::ChestNonContrast => "chest-non-contrast",
			Modality::ChestContrast => "chest-contrast",
			Modality::CoronaryCta => "coronary-cta",
			Modality::Hemorrhage => "hemorrhage",
		}
	}

	/// Detection endpoint relative to the API prefix.
	pub fn endpoint(self) -> String {
		match self {
			Modality::Hemorrhage => "/quality/hemorrhage".to_string(),
			other => format!("/quality/{}/detect", other.slug()),
		}
	}
}

impl fmt::Display for Modality {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.slug())
	}
}

impl FromStr for Modality {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Modality::ALL
			.into_iter()
			.find(|m| m.slug().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("unknown modality: {s}"))
	}
}

/// Verdict for a single QC item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
	#[serde(rename = "合格")]
	Pass,
	#[serde(rename = "不合格")]
	Fail,
}

/// One checked item of a detection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcIssue {
	pub item: String,
	pub status: IssueStatus,
}

/// Uniform result shape of every detector, real or simulated.
///
/// Fields beyond `issues`/`duration` (hemorrhage probabilities, image echo,
/// ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
	#[serde(default)]
	pub issues: Vec<QcIssue>,
	/// Analysis time in milliseconds.
	#[serde(default)]
	pub duration: u64,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl DetectionReport {
	/// Items that did not pass.
	pub fn failures(&self) -> impl Iterator<Item = &QcIssue> {
		self.issues.iter().filter(|issue| issue.status == IssueStatus::Fail)
	}

	pub fn passed(&self) -> bool {
		self.failures().next().is_none()
	}
}

/// Response of `GET /quality/hemorrhage/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HemorrhageHistory {
	#[serde(default)]
	pub data: Vec<Value>,
}
