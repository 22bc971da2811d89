//! Logging setup shared by the Kafka helper binaries.

pub mod tracing;
