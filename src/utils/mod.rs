//! Logging setup and timing records.
pub mod bench;
pub mod logger;
