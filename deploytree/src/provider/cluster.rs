use std::path::Path;

use k8s_openapi::api::{
    apps::v1::{Deployment, ReplicaSet},
    core::v1::Service,
};
use kube::{
    Api,
    api::ListParams,
    config::{KubeConfigOptions, Kubeconfig},
};
use snafu::ResultExt;

use super::{ResourceProvider, error, error::Error};

/// Builds a Kubernetes client.
///
/// An explicit `kubeconfig` path is read as is. Without one the configuration
/// is inferred the way `kubectl` does it: `$KUBECONFIG`, then
/// `$HOME/.kube/config`, then the in-cluster service account. `context`
/// selects a kubeconfig context other than the current one.
///
/// # Errors
///
/// Returns an error if the kubeconfig cannot be read or does not describe a
/// usable cluster, or if the client cannot be constructed from it.
pub async fn connect(
    kubeconfig: Option<&Path>,
    context: Option<String>,
) -> Result<kube::Client, Error> {
    let options = KubeConfigOptions { context, ..KubeConfigOptions::default() };
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|_| error::ReadKubeconfigSnafu { path: path.to_path_buf() })?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context(error::LoadKubeconfigSnafu)?
        }
        None if options.context.is_some() => {
            kube::Config::from_kubeconfig(&options).await.context(error::LoadKubeconfigSnafu)?
        }
        None => kube::Config::infer().await.context(error::InferConfigSnafu)?,
    };
    tracing::debug!("Connecting to Kubernetes API server at {}", config.cluster_url);

    kube::Client::try_from(config).context(error::CreateClientSnafu)
}

/// [`ResourceProvider`] backed by a live cluster.
#[derive(Clone)]
pub struct KubeProvider {
    client: kube::Client,
}

impl From<kube::Client> for KubeProvider {
    fn from(client: kube::Client) -> Self { Self { client } }
}

impl ResourceProvider for KubeProvider {
    fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Deployment, Error>> + Send {
        let api = Api::<Deployment>::namespaced(self.client.clone(), namespace);
        async move {
            match api.get(name).await {
                Ok(deployment) => Ok(deployment),
                Err(kube::Error::Api(status)) if status.code == 404 => {
                    error::DeploymentNotFoundSnafu { namespace, name }.fail()
                }
                Err(source) => Err(source).context(error::GetDeploymentSnafu { namespace, name }),
            }
        }
    }

    fn list_services(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Service>, Error>> + Send {
        let api = Api::<Service>::namespaced(self.client.clone(), namespace);
        async move {
            api.list(&ListParams::default().labels(selector))
                .await
                .map(|list| list.items)
                .context(error::ListServicesSnafu { namespace, selector })
        }
    }

    fn list_replica_sets(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<ReplicaSet>, Error>> + Send {
        let api = Api::<ReplicaSet>::namespaced(self.client.clone(), namespace);
        async move {
            api.list(&ListParams::default().labels(selector))
                .await
                .map(|list| list.items)
                .context(error::ListReplicaSetsSnafu { namespace, selector })
        }
    }
}
