pub mod engine;
pub mod error;
pub mod selection;
pub mod stats;
pub mod stores;
