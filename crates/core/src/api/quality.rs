//! Quality-control records.

use std::sync::Arc;

use qc_protocol::HemorrhageHistory;

use crate::error::Result;
use crate::transport::{ApiRequest, TransportClient};

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Debug, Clone)]
pub struct QualityApi {
	transport: Arc<TransportClient>,
}

impl QualityApi {
	pub fn new(transport: Arc<TransportClient>) -> Self {
		Self { transport }
	}

	/// `GET /quality/hemorrhage/history`: most recent hemorrhage analyses of the current user.
	pub async fn hemorrhage_history(&self, limit: Option<u32>) -> Result<HemorrhageHistory> {
		let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
		self.transport.send(ApiRequest::get("/quality/hemorrhage/history").query("limit", limit)).await
	}
}
