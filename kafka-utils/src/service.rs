use std::path::Path;

use k8s_openapi::api::core::v1::{LoadBalancerIngress, Service};
use kafka_config::shared::IngressConfig;
use tracing::{error, info, warn};

use crate::error::IngressError;
use crate::k8s::K8sClient;
use crate::listeners::ListenerFiles;

/// Suffix of the service exposing a broker outside of the cluster.
const EXTERNAL_SERVICE_SUFFIX: &str = "external";

/// Node address type holding the publicly reachable IP.
const NODE_EXTERNAL_IP: &str = "ExternalIP";

/// A simplified view of a service type.
///
/// Only the types the resolver reacts to are tracked. Unknown or missing values
/// map to [`ServiceType::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceType {
    LoadBalancer,
    NodePort,
    ExternalName,
    ClusterIp,
    Unsupported(String),
}

impl From<&str> for ServiceType {
    fn from(value: &str) -> Self {
        match value {
            "LoadBalancer" => ServiceType::LoadBalancer,
            "NodePort" => ServiceType::NodePort,
            "ExternalName" => ServiceType::ExternalName,
            "ClusterIP" => ServiceType::ClusterIp,
            other => ServiceType::Unsupported(other.to_string()),
        }
    }
}

impl ServiceType {
    pub fn of(service: &Service) -> ServiceType {
        service
            .spec
            .as_ref()
            .and_then(|spec| spec.type_.as_deref())
            .unwrap_or_default()
            .into()
    }
}

/// External addresses of a broker together with the node port, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedIngress {
    pub ingresses: Vec<LoadBalancerIngress>,
    pub node_port: Option<i32>,
}

impl ResolvedIngress {
    /// Returns the node port when one was captured, `external_ingress_port` otherwise.
    pub fn port(&self, external_ingress_port: &str) -> String {
        match self.node_port {
            Some(node_port) if node_port != 0 => node_port.to_string(),
            _ => external_ingress_port.to_string(),
        }
    }
}

/// Returns the assigned load balancer ingress of `service`, `None` while pending.
fn load_balancer_ingress(service: &Service) -> Option<Vec<LoadBalancerIngress>> {
    service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .clone()
        .filter(|ingress| !ingress.is_empty())
}

/// Resolves the external ingress of the broker running in this pod.
pub struct KafkaService<C> {
    client: C,
    config: IngressConfig,
}

impl<C> KafkaService<C>
where
    C: K8sClient,
{
    pub fn new(client: C, config: IngressConfig) -> Self {
        Self { client, config }
    }

    /// Resolves the ingress and appends the listener files under `base_path`.
    ///
    /// Nothing is written when no external service exists or when its type
    /// cannot expose the broker.
    pub async fn write_ingress_to_path(&self, base_path: &Path) -> Result<(), IngressError> {
        let Some(resolved) = self.resolve_ingress().await? else {
            return Ok(());
        };

        let port = resolved.port(&self.config.external_ingress_port);
        let files = ListenerFiles::render(
            &resolved.ingresses,
            &port,
            &self.config.listener_security_protocol_map,
        );
        files.write_to(base_path);

        Ok(())
    }

    /// Looks up the `<hostname>-external` service and derives the external ingress.
    ///
    /// Returns `None` when there is nothing to write. Failing to list services
    /// is logged and treated like a missing service.
    pub async fn resolve_ingress(&self) -> Result<Option<ResolvedIngress>, IngressError> {
        let hostname = &self.config.hostname;
        if hostname.is_empty() {
            return Err(IngressError::MissingHostname);
        }

        let namespace = &self.config.namespace;
        let service_name = format!("{hostname}-{EXTERNAL_SERVICE_SUFFIX}");
        info!(%hostname, %namespace, "checking the service created for the broker");

        let services = match self
            .client
            .list_services_by_name(namespace, &service_name)
            .await
        {
            Ok(services) => services,
            Err(err) => {
                error!("error listing the services for {service_name}: {err}");
                Vec::new()
            }
        };

        if services.is_empty() {
            info!("no service found for {service_name}");
            return Ok(None);
        }

        let mut resolved = ResolvedIngress::default();
        for service in &services {
            match ServiceType::of(service) {
                ServiceType::LoadBalancer => {
                    info!("detected LoadBalancer");
                    // Cloud load balancers are often still provisioning while the broker boots.
                    resolved.ingresses = match load_balancer_ingress(service) {
                        Some(ingresses) => ingresses,
                        None => {
                            info!("the load balancer status is pending");
                            self.wait_for_load_balancer(&service_name).await
                        }
                    };
                }
                ServiceType::NodePort => {
                    info!("detected NodePort");
                    let external_ip = self.node_external_ip().await?;
                    info!(%external_ip, "detected node external IP");

                    resolved.ingresses = vec![LoadBalancerIngress {
                        ip: Some(external_ip),
                        ..LoadBalancerIngress::default()
                    }];
                    resolved.node_port = service
                        .spec
                        .as_ref()
                        .and_then(|spec| spec.ports.as_ref())
                        .and_then(|ports| ports.last())
                        .and_then(|port| port.node_port);
                }
                ServiceType::ExternalName => {
                    info!("detected ExternalName but cannot reach any kafka pods through it");
                    return Ok(None);
                }
                ServiceType::ClusterIp => {
                    info!(
                        "detected ClusterIP. Currently not supported for ingress. For internal usage use the default headless service"
                    );
                    return Ok(None);
                }
                ServiceType::Unsupported(service_type) => {
                    info!("service type '{service_type}' detected but not supported");
                    return Ok(None);
                }
            }
        }

        Ok(Some(resolved))
    }

    /// Re-fetches the service at a fixed interval until its ingress is assigned.
    ///
    /// Gives up with an empty ingress once the attempts are exhausted.
    async fn wait_for_load_balancer(&self, service_name: &str) -> Vec<LoadBalancerIngress> {
        let poll = self.config.load_balancer_poll();

        for attempt in 1..=poll.max_attempts {
            match self
                .client
                .get_service(&self.config.namespace, service_name)
                .await
            {
                Ok(service) => {
                    if let Some(ingresses) = load_balancer_ingress(&service) {
                        info!(attempt, "the load balancer status found");
                        return ingresses;
                    }
                    info!(attempt, "the load balancer status is still pending");
                }
                Err(err) => {
                    warn!(attempt, "error fetching service {service_name}: {err}");
                }
            }

            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval()).await;
            }
        }

        warn!(
            attempts = poll.max_attempts,
            "the load balancer status is still pending, continuing without ingress"
        );

        Vec::new()
    }

    /// Returns the `ExternalIP` address of the node this pod runs on.
    async fn node_external_ip(&self) -> Result<String, IngressError> {
        let node_name = &self.config.node_name;
        let node = self.client.get_node(node_name).await.map_err(|source| {
            error!("error fetching nodes external IP: {source}");
            IngressError::NodeLookup {
                node_name: node_name.clone(),
                source,
            }
        })?;

        node.status
            .and_then(|status| status.addresses)
            .unwrap_or_default()
            .into_iter()
            .find(|address| address.type_ == NODE_EXTERNAL_IP)
            .map(|address| address.address)
            .ok_or_else(|| IngressError::MissingNodeExternalIp(node_name.clone()))
    }
}
