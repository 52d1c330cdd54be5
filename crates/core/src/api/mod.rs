//! Typed facades over the QC REST endpoints.
//!
//! Each facade is a cheap clone around the shared [`TransportClient`] and
//! returns unwrapped payloads; failures carry the transport's classification.
//!
//! [`TransportClient`]: crate::transport::TransportClient

mod auth;
mod quality;
mod summary;

pub use auth::AuthApi;
pub use quality::{DEFAULT_HISTORY_LIMIT, QualityApi};
pub use summary::{DEFAULT_TREND_DAYS, SummaryApi};
