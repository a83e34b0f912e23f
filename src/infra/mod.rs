//! Infrastructure adapters and runtime bootstrap.

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod preferences;
pub mod telemetry;
