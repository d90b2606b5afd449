pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod runtime;
pub mod telemetry;
