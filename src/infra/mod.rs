pub mod engine;
pub mod error;
pub mod http;
pub mod options;
pub mod telemetry;
