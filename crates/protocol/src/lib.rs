//! Wire types for the medical QC service API.
//!
//! This crate contains the serde-serializable types exchanged with the QC
//! backend under `/api/v1`. These types represent the "protocol layer": the
//! shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization and small accessors
//! * 1:1 with the backend: Field names follow the server's JSON
//! * Lenient on input: optional fields default so older servers still decode
//!
//! Session handling, transport and navigation live in `qc-client`.

pub mod auth;
pub mod quality;
pub mod summary;

pub use auth::*;
pub use quality::*;
pub use summary::*;
