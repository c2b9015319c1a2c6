//! Rendering of a [`Resolution`] as a tree.

use crate::{
    consts::{DEPLOYMENT_LABEL, TREE_PATH_SEPARATOR},
    resolver::{Category, Resolution},
    ui::tree::PathTree,
};

pub trait ResolutionExt {
    /// The tree paths describing this resolution, in insertion order.
    ///
    /// Every path starts at `Deployment: <name>` followed by a category
    /// heading such as `Service: `. Service and ReplicaSet contribute the
    /// heading and, when found, a path ending in the resource name. List
    /// categories contribute the bare heading when empty; otherwise each name
    /// is appended to the previous path, so later names nest below earlier
    /// ones.
    fn tree_paths(&self) -> Vec<String>;

    /// Renders [`ResolutionExt::tree_paths`] as an indented tree.
    fn render_tree(&self) -> String {
        self.tree_paths().into_iter().collect::<PathTree>().to_string()
    }
}

impl ResolutionExt for Resolution {
    fn tree_paths(&self) -> Vec<String> {
        let root = format!("{DEPLOYMENT_LABEL}: {}", self.deployment.name);
        let heading =
            |category: Category| format!("{root}{TREE_PATH_SEPARATOR}{}: ", category.label());
        let mut paths = Vec::new();

        for (category, name) in
            [(Category::Service, &self.service), (Category::ReplicaSet, &self.replica_set)]
        {
            let heading = heading(category);
            let populated =
                name.as_ref().map(|name| format!("{heading}{TREE_PATH_SEPARATOR}{name}"));
            paths.push(heading);
            paths.extend(populated);
        }

        for (category, names) in [
            (Category::ConfigMap, &self.config_maps),
            (Category::Secret, &self.secrets),
            (Category::Volume, &self.volumes),
        ] {
            let mut path = heading(category);
            if names.is_empty() {
                paths.push(path);
                continue;
            }
            for name in names {
                path.push(TREE_PATH_SEPARATOR);
                path.push_str(name);
                paths.push(path.clone());
            }
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DeploymentRef;

    fn resolution() -> Resolution {
        Resolution {
            deployment: DeploymentRef { name: "web".to_string(), namespace: "default".to_string() },
            service: Some("web-svc".to_string()),
            replica_set: Some("web-7f9c".to_string()),
            config_maps: vec!["web-cfg".to_string(), "web-vol-cfg".to_string()],
            secrets: vec!["web-sec".to_string()],
            volumes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_tree_paths() {
        assert_eq!(
            resolution().tree_paths(),
            [
                "Deployment: web/Service: ",
                "Deployment: web/Service: /web-svc",
                "Deployment: web/Replica Set: ",
                "Deployment: web/Replica Set: /web-7f9c",
                "Deployment: web/Config Maps: /web-cfg",
                "Deployment: web/Config Maps: /web-cfg/web-vol-cfg",
                "Deployment: web/Secrets: /web-sec",
                "Deployment: web/Volumes: ",
            ]
        );
    }

    #[test]
    fn test_render_tree() {
        let expected = [
            "Deployment: web",
            "├── Service: ",
            "│   └── web-svc",
            "├── Replica Set: ",
            "│   └── web-7f9c",
            "├── Config Maps: ",
            "│   └── web-cfg",
            "│       └── web-vol-cfg",
            "├── Secrets: ",
            "│   └── web-sec",
            "└── Volumes: ",
        ]
        .map(|line| format!("{line}\n"))
        .concat();

        assert_eq!(resolution().render_tree(), expected);
    }

    #[test]
    fn test_absent_lookups_keep_their_heading() {
        let resolution = Resolution {
            service: None,
            replica_set: None,
            config_maps: Vec::new(),
            secrets: Vec::new(),
            ..resolution()
        };

        assert_eq!(
            resolution.tree_paths(),
            [
                "Deployment: web/Service: ",
                "Deployment: web/Replica Set: ",
                "Deployment: web/Config Maps: ",
                "Deployment: web/Secrets: ",
                "Deployment: web/Volumes: ",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_nest() {
        let resolution =
            Resolution { volumes: vec!["data".to_string(), "data".to_string()], ..resolution() };

        let paths = resolution.tree_paths();

        assert_eq!(
            &paths[paths.len() - 2..],
            ["Deployment: web/Volumes: /data", "Deployment: web/Volumes: /data/data"]
        );
    }
}
