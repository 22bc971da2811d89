//! Configuration management for the Kafka operator helpers.
//!
//! Provides environment detection, loading of settings from process environment
//! variables, and the shared configuration types consumed by the connectors setup
//! tool and the ingress resolver sidecar.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
