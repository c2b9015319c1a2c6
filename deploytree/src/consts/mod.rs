use std::time::Duration;

/// Namespace used when neither the command line nor the configuration names
/// one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Upper bound on a single resolution, Deployment fetch included.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Label of the tree root, rendered as `Deployment: <name>`.
pub const DEPLOYMENT_LABEL: &str = "Deployment";

/// Separator between the segments of a tree path.
pub const TREE_PATH_SEPARATOR: char = '/';
