//! Infrastructure layer: backend HTTP client and telemetry.

pub mod api;
pub mod error;
pub mod telemetry;
