use std::fmt;

use serde::Serialize;

use crate::extractor::ReferenceKind;

/// The Deployment a resolution starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploymentRef {
    pub name: String,
    pub namespace: String,
}

/// The kinds of resources reported for a Deployment, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Service,
    ReplicaSet,
    ConfigMap,
    Secret,
    Volume,
}

impl Category {
    pub const ALL: [Self; 5] =
        [Self::Service, Self::ReplicaSet, Self::ConfigMap, Self::Secret, Self::Volume];

    /// Heading used for the category in the rendered tree.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Service => "Service",
            Self::ReplicaSet => "Replica Set",
            Self::ConfigMap => "Config Maps",
            Self::Secret => "Secrets",
            Self::Volume => "Volumes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl From<ReferenceKind> for Category {
    fn from(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::ConfigMap => Self::ConfigMap,
            ReferenceKind::Secret => Self::Secret,
            ReferenceKind::Volume => Self::Volume,
        }
    }
}

/// A problem that left one category incomplete without failing the
/// resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub category: Category,
    pub message: String,
}

impl Warning {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self { category, message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Everything found for one Deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub deployment: DeploymentRef,
    pub service: Option<String>,
    pub replica_set: Option<String>,
    pub config_maps: Vec<String>,
    pub secrets: Vec<String>,
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}
