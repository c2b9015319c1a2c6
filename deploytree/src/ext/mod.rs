//! Extensions to Kubernetes API types.
//!
//! These traits add the small pieces of derived data the resolver needs on
//! top of `k8s_openapi` types: the label selector of a `Deployment` and the
//! pod spec of its template.

mod deployment;
mod error;

pub use self::{deployment::DeploymentExt, error::InvalidSelector};
