//! Access to the cluster resources the resolver reads.
//!
//! [`ResourceProvider`] is the seam between the resolver and the Kubernetes
//! API: [`KubeProvider`] talks to a real cluster, tests substitute an
//! in-memory implementation.

mod cluster;
mod error;
#[cfg(test)]
pub mod fake;

use k8s_openapi::api::{
    apps::v1::{Deployment, ReplicaSet},
    core::v1::Service,
};

pub use self::{
    cluster::{KubeProvider, connect},
    error::Error,
};

/// Point lookups and label-selector listings against a cluster.
///
/// Implementations are cheap to clone; the resolver hands a clone to each of
/// its concurrent tasks.
pub trait ResourceProvider: Clone + Send + Sync + 'static {
    /// Fetches a single Deployment.
    ///
    /// A missing Deployment is reported as [`Error::DeploymentNotFound`].
    fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Deployment, Error>> + Send;

    /// Lists the Services in `namespace` matching `selector`.
    fn list_services(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Service>, Error>> + Send;

    /// Lists the ReplicaSets in `namespace` matching `selector`.
    fn list_replica_sets(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<ReplicaSet>, Error>> + Send;
}
