use std::time::Duration;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{source}"))]
    GetDeployment { source: crate::provider::Error },

    #[snafu(display(
        "Timed out after {}s fetching deployment {name} in namespace {namespace}",
        timeout.as_secs()
    ))]
    DeploymentTimedOut { namespace: String, name: String, timeout: Duration },

    #[snafu(display(
        "Failed to derive label selector of deployment {name} in namespace {namespace}, error: \
         {source}"
    ))]
    DeriveSelector { namespace: String, name: String, source: crate::ext::InvalidSelector },
}
