#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, LoadBalancerStatus, Node, NodeAddress, NodeStatus, Service, ServicePort,
    ServiceSpec, ServiceStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kafka_config::shared::IngressConfig;
use kafka_utils::k8s::{K8sClient, K8sError};

pub const NAMESPACE: &str = "default";
pub const HOSTNAME: &str = "kafka-kafka-0";
pub const SERVICE_NAME: &str = "kafka-kafka-0-external";
pub const NODE_NAME: &str = "kubelet-0";

#[derive(Debug, Default)]
struct State {
    services: Vec<Service>,
    nodes: HashMap<String, Node>,
    fail_listing: bool,
    get_service_calls: usize,
    // Ingress assigned to the service once `get_service` was called that many times.
    late_ingress: Option<(usize, Vec<LoadBalancerIngress>)>,
}

/// In-memory [`K8sClient`] serving a fixed set of services and nodes.
#[derive(Debug, Clone, Default)]
pub struct MockK8sClient {
    state: Arc<Mutex<State>>,
}

impl MockK8sClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(self, service: Service) -> Self {
        self.state.lock().unwrap().services.push(service);
        self
    }

    pub fn with_node(self, node: Node) -> Self {
        let name = node.metadata.name.clone().unwrap_or_default();
        self.state.lock().unwrap().nodes.insert(name, node);
        self
    }

    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_listing = true;
        self
    }

    /// Makes the load balancer ingress show up on the `polls`-th fetch of the service.
    pub fn assign_ingress_after(self, polls: usize, ingresses: Vec<LoadBalancerIngress>) -> Self {
        self.state.lock().unwrap().late_ingress = Some((polls, ingresses));
        self
    }

    pub fn get_service_calls(&self) -> usize {
        self.state.lock().unwrap().get_service_calls
    }
}

fn matches(service: &Service, namespace: &str, name: &str) -> bool {
    service.metadata.namespace.as_deref() == Some(namespace)
        && service.metadata.name.as_deref() == Some(name)
}

#[async_trait]
impl K8sClient for MockK8sClient {
    async fn list_services_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Vec<Service>, K8sError> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(K8sError::NotFound {
                kind: "namespace",
                name: namespace.to_string(),
            });
        }

        Ok(state
            .services
            .iter()
            .filter(|service| matches(service, namespace, name))
            .cloned()
            .collect())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, K8sError> {
        let mut state = self.state.lock().unwrap();
        state.get_service_calls += 1;

        let mut service = state
            .services
            .iter()
            .find(|service| matches(service, namespace, name))
            .cloned()
            .ok_or_else(|| K8sError::NotFound {
                kind: "service",
                name: format!("{namespace}/{name}"),
            })?;

        if let Some((polls, ingresses)) = &state.late_ingress {
            if state.get_service_calls >= *polls {
                service.status = Some(load_balancer_status(ingresses.clone()));
            }
        }

        Ok(service)
    }

    async fn get_node(&self, name: &str) -> Result<Node, K8sError> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| K8sError::NotFound {
                kind: "node",
                name: name.to_string(),
            })
    }
}

pub fn ingress_config(external_ingress_port: &str, security_protocol_map: &str) -> IngressConfig {
    IngressConfig {
        hostname: HOSTNAME.to_string(),
        namespace: NAMESPACE.to_string(),
        node_name: NODE_NAME.to_string(),
        external_ingress_port: external_ingress_port.to_string(),
        listener_security_protocol_map: security_protocol_map.to_string(),
        load_balancer_poll_attempts: 3,
        load_balancer_poll_interval_ms: 1_000,
    }
}

fn load_balancer_status(ingresses: Vec<LoadBalancerIngress>) -> ServiceStatus {
    ServiceStatus {
        load_balancer: Some(LoadBalancerStatus {
            ingress: Some(ingresses),
        }),
        ..ServiceStatus::default()
    }
}

pub fn service(name: &str, service_type: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..ObjectMeta::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(service_type.to_string()),
            ..ServiceSpec::default()
        }),
        ..Service::default()
    }
}

pub fn load_balancer_service(name: &str, ingresses: Vec<LoadBalancerIngress>) -> Service {
    Service {
        status: Some(load_balancer_status(ingresses)),
        ..service(name, "LoadBalancer")
    }
}

pub fn node_port_service(name: &str, node_ports: &[i32]) -> Service {
    let mut service = service(name, "NodePort");
    if let Some(spec) = service.spec.as_mut() {
        spec.ports = Some(
            node_ports
                .iter()
                .map(|node_port| ServicePort {
                    port: 9093,
                    node_port: Some(*node_port),
                    ..ServicePort::default()
                })
                .collect(),
        );
    }

    service
}

pub fn node(name: &str, addresses: &[(&str, &str)]) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        status: Some(NodeStatus {
            addresses: Some(
                addresses
                    .iter()
                    .map(|(type_, address)| NodeAddress {
                        type_: type_.to_string(),
                        address: address.to_string(),
                    })
                    .collect(),
            ),
            ..NodeStatus::default()
        }),
        ..Node::default()
    }
}

pub fn hostname_ingress(hostname: &str) -> LoadBalancerIngress {
    LoadBalancerIngress {
        hostname: Some(hostname.to_string()),
        ..LoadBalancerIngress::default()
    }
}

pub fn ip_ingress(ip: &str) -> LoadBalancerIngress {
    LoadBalancerIngress {
        ip: Some(ip.to_string()),
        ..LoadBalancerIngress::default()
    }
}
