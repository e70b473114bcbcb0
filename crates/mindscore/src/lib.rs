pub mod assessment;
pub mod config;
pub mod error;
pub mod narrative;
pub mod telemetry;
