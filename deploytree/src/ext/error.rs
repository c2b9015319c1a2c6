use snafu::Snafu;

/// Errors raised while deriving the label selector of a Deployment.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InvalidSelector {
    #[snafu(display("Deployment has no pod selector"))]
    MissingSelector,

    #[snafu(display("Failed to parse pod selector, error: {source}"))]
    ParseSelector { source: kube::core::ParseExpressionError },
}
