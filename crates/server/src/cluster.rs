//! Pod listing against a caller-supplied cluster credential
//!
//! The only network I/O in the system: builds a kube client from the
//! kubeconfig shipped with the request and lists pods across all
//! namespaces, reducing each container to its declared resource strings.

use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use sizer_lib::{ContainerResources, PodResources};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),
    #[error("failed to list pods: {0}")]
    ListFailed(#[source] kube::Error),
}

/// List every pod in the cluster and reduce it to resource declarations
pub async fn list_cluster_pods(kubeconfig_yaml: &str) -> Result<Vec<PodResources>, ClusterError> {
    let kubeconfig = Kubeconfig::from_yaml(kubeconfig_yaml)
        .map_err(|err| ClusterError::InvalidKubeconfig(err.to_string()))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|err| ClusterError::InvalidKubeconfig(err.to_string()))?;
    let client =
        Client::try_from(config).map_err(|err| ClusterError::InvalidKubeconfig(err.to_string()))?;

    let pods: Api<Pod> = Api::all(client);
    let list = pods
        .list(&ListParams::default())
        .await
        .map_err(ClusterError::ListFailed)?;

    let descriptors: Vec<PodResources> = list.items.iter().map(pod_resources).collect();
    debug!(pods = descriptors.len(), "Listed cluster pods");
    Ok(descriptors)
}

/// Reduce one pod to the closed resource record the aggregator consumes
fn pod_resources(pod: &Pod) -> PodResources {
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(container_resources).collect())
        .unwrap_or_default();

    PodResources {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        containers,
    }
}

fn container_resources(container: &Container) -> ContainerResources {
    let requests = container.resources.as_ref().and_then(|r| r.requests.as_ref());
    let limits = container.resources.as_ref().and_then(|r| r.limits.as_ref());

    ContainerResources {
        name: container.name.clone(),
        cpu_request: quantity(requests, "cpu"),
        memory_request: quantity(requests, "memory"),
        cpu_limit: quantity(limits, "cpu"),
        memory_limit: quantity(limits, "memory"),
    }
}

fn quantity(map: Option<&BTreeMap<String, Quantity>>, key: &str) -> Option<String> {
    map.and_then(|m| m.get(key)).map(|q| q.0.clone())
}
