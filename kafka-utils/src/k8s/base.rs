use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Service};
use thiserror::Error;

/// Errors emitted by the Kubernetes integration.
#[derive(Debug, Error)]
pub enum K8sError {
    /// The requested object does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    /// An error returned by the [`kube`] client when talking to the API server.
    #[error("An error occurred with kube when dealing with K8s: {0}")]
    Kube(#[from] kube::Error),
}

/// Read-only view of the Kubernetes API used by the ingress resolver.
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Lists the services of `namespace` whose `metadata.name` equals `name`.
    async fn list_services_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<Service>, K8sError>;

    /// Retrieves the service `name` of `namespace`.
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, K8sError>;

    /// Retrieves the cluster node `name`.
    async fn get_node(&self, name: &str) -> Result<Node, K8sError>;
}
