//! Downloads connector plugin archives and registers connectors in Kafka Connect.
//!
//! The binary is driven by a [`kafka_config::shared::ConnectorsFile`]. All side
//! effects go through [`ops::ConnectorOps`] so the command logic in [`setup`]
//! can be exercised without a network.

pub mod archive;
pub mod error;
pub mod ops;
pub mod setup;
