//! Bootstrap helper writing the external listener configuration of a Kafka broker.
//!
//! On startup the broker pod looks up its `<hostname>-external` service, works
//! out the address clients outside the cluster reach it through, and leaves it
//! in a handful of files read by the broker start script. See
//! [`service::KafkaService`] for the resolution rules and [`listeners`] for the
//! file formats.

pub mod error;
pub mod k8s;
pub mod listeners;
pub mod service;
