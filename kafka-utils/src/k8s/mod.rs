//! Kubernetes integration for the ingress resolver.
//!
//! The resolver only needs to read `Service` and `Node` objects. Consumers depend
//! on the [`K8sClient`] trait; [`http::HttpK8sClient`] is the [`kube`] backed
//! implementation using the ambient configuration (in-cluster service account or
//! local `~/.kube/config`). Tests provide an in-memory implementation instead.

mod base;
pub mod http;

pub use base::*;
