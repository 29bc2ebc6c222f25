pub mod config;
pub mod error;
pub mod events;
pub mod quiz;
pub mod scoring;
pub mod telemetry;
