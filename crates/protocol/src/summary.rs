//! Issue summary payloads (`/summary/*`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `GET /summary/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
	#[serde(default)]
	pub total_scans: u64,
	#[serde(default)]
	pub today_scans: u64,
	#[serde(default)]
	pub pending_issues: u64,
	#[serde(default)]
	pub quality_score: f64,
}

/// Response of `GET /summary/trend`: parallel date/count series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTrend {
	#[serde(default)]
	pub dates: Vec<String>,
	#[serde(default)]
	pub issues: Vec<u64>,
}

/// One slice of `GET /summary/distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSlice {
	pub name: String,
	pub value: u64,
}

/// Query string of `GET /summary/recent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentIssuesQuery {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
}

/// Response of `GET /summary/recent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentIssues {
	#[serde(default)]
	pub total: u64,
	#[serde(default)]
	pub items: Vec<RecentIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentIssue {
	pub id: u64,
	#[serde(default)]
	pub patient_name: String,
	#[serde(default)]
	pub exam_id: String,
	#[serde(default)]
	pub scan_type: String,
	#[serde(default)]
	pub issue_type: String,
	#[serde(default)]
	pub status: String,
	/// Server timestamp, either epoch millis or an ISO string.
	#[serde(default)]
	pub timestamp: Value,
}
