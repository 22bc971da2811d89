use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Service};
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::debug;

use crate::k8s::{K8sClient, K8sError};

/// [`K8sClient`] implementation talking to the API server through [`kube`].
#[derive(Clone)]
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Builds a client from the ambient configuration.
    ///
    /// Inside a pod this uses the mounted service account, elsewhere the local
    /// kubeconfig.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(Self::with_client(client))
    }

    /// Wraps an existing [`Client`], e.g. one built from an explicit kubeconfig.
    pub fn with_client(client: Client) -> HttpK8sClient {
        HttpK8sClient { client }
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn list_services_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<Service>, K8sError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("metadata.name={name}"));

        let list = services.list(&params).await?;
        debug!(%namespace, %name, count = list.items.len(), "listed services");

        Ok(list.items)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, K8sError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);

        services
            .get_opt(name)
            .await?
            .ok_or_else(|| K8sError::NotFound {
                kind: "service",
                name: format!("{namespace}/{name}"),
            })
    }

    async fn get_node(&self, name: &str) -> Result<Node, K8sError> {
        let nodes: Api<Node> = Api::all(self.client.clone());

        nodes.get_opt(name).await?.ok_or_else(|| K8sError::NotFound {
            kind: "node",
            name: name.to_string(),
        })
    }
}
