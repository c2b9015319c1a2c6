use k8s_openapi::api::{apps::v1::Deployment, core::v1::PodSpec};
use kube::core::Selector;
use snafu::{OptionExt, ResultExt};

use super::error::{InvalidSelector, MissingSelectorSnafu, ParseSelectorSnafu};

pub trait DeploymentExt {
    /// Derives the label selector used to find the Service and ReplicaSet
    /// belonging to this Deployment.
    ///
    /// The selector renders in the `labelSelector` query syntax, e.g.
    /// `app=web,tier in (backend,frontend),!canary`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSelector`] if the Deployment has no spec or its
    /// selector has an unknown operator or a set operator without values.
    fn label_selector(&self) -> Result<Selector, InvalidSelector>;

    /// The pod spec of the Deployment's template, if any.
    fn pod_spec(&self) -> Option<&PodSpec>;
}

impl DeploymentExt for Deployment {
    fn label_selector(&self) -> Result<Selector, InvalidSelector> {
        let spec = self.spec.as_ref().context(MissingSelectorSnafu)?;
        Selector::try_from(spec.selector.clone()).context(ParseSelectorSnafu)
    }

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|spec| spec.template.spec.as_ref())
    }
}
