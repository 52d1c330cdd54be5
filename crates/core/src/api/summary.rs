//! Issue summary statistics.

use std::sync::Arc;

use qc_protocol::{DistributionSlice, IssueTrend, RecentIssues, RecentIssuesQuery, SummaryStats};

use crate::error::Result;
use crate::transport::{ApiRequest, TransportClient};

pub const DEFAULT_TREND_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct SummaryApi {
	transport: Arc<TransportClient>,
}

impl SummaryApi {
	pub fn new(transport: Arc<TransportClient>) -> Self {
		Self { transport }
	}

	pub async fn stats(&self) -> Result<SummaryStats> {
		self.transport.send(ApiRequest::get("/summary/stats")).await
	}

	/// Daily issue counts over the last `days` days.
	pub async fn trend(&self, days: Option<u32>) -> Result<IssueTrend> {
		let days = days.unwrap_or(DEFAULT_TREND_DAYS);
		self.transport.send(ApiRequest::get("/summary/trend").query("days", days)).await
	}

	pub async fn distribution(&self) -> Result<Vec<DistributionSlice>> {
		self.transport.send(ApiRequest::get("/summary/distribution")).await
	}

	/// Paged, filterable list of recent issues.
	pub async fn recent(&self, query: &RecentIssuesQuery) -> Result<RecentIssues> {
		self.transport.send(ApiRequest::get("/summary/recent").query_struct(query)?).await
	}
}
