use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read kubeconfig from {}, error: {source}", path.display()))]
    ReadKubeconfig {
        path: PathBuf,
        #[snafu(source(from(kube::config::KubeconfigError, Box::new)))]
        source: Box<kube::config::KubeconfigError>,
    },

    #[snafu(display("Failed to load Kubernetes client configuration, error: {source}"))]
    LoadKubeconfig {
        #[snafu(source(from(kube::config::KubeconfigError, Box::new)))]
        source: Box<kube::config::KubeconfigError>,
    },

    #[snafu(display("Failed to infer Kubernetes client configuration, error: {source}"))]
    InferConfig {
        #[snafu(source(from(kube::config::InferConfigError, Box::new)))]
        source: Box<kube::config::InferConfigError>,
    },

    #[snafu(display("Failed to initialize Kubernetes client, error: {source}"))]
    CreateClient {
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Deployment {name} is not found in namespace {namespace}"))]
    DeploymentNotFound { namespace: String, name: String },

    #[snafu(display(
        "Failed to get deployment {name} in namespace {namespace}, error: {source}"
    ))]
    GetDeployment {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to list services matching '{selector}' in namespace {namespace}, error: {source}"
    ))]
    ListServices {
        namespace: String,
        selector: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to list replica sets matching '{selector}' in namespace {namespace}, error: \
         {source}"
    ))]
    ListReplicaSets {
        namespace: String,
        selector: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },
}
