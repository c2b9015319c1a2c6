//! Discovers the ConfigMaps, Secrets and plain Volumes referenced by a pod
//! spec.
//!
//! Traversal order is user visible, so it is fixed: for each container in
//! declaration order its `env` references and then its `envFrom` sources,
//! followed by the pod's volumes. Duplicates are preserved.

use std::fmt;

use k8s_openapi::api::core::v1::{Container, EnvFromSource, EnvVar, PodSpec, Volume};
use snafu::Snafu;

/// The kind of resource a reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    ConfigMap,
    Secret,
    /// A volume backed by neither a ConfigMap nor a Secret.
    Volume,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigMap => "ConfigMap",
            Self::Secret => "Secret",
            Self::Volume => "Volume",
        })
    }
}

/// A reference that selects a resource of the requested kind but does not
/// name one.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(display("{kind} reference in {origin} does not name a resource"))]
pub struct MalformedReference {
    kind: ReferenceKind,
    origin: String,
}

/// Returns the names of every resource of `kind` referenced by `pod_spec`.
///
/// The iterator is lazy and borrows the spec; malformed references are
/// yielded as errors in their traversal position so the caller decides
/// whether to skip them.
pub fn references(
    pod_spec: &PodSpec,
    kind: ReferenceKind,
) -> impl Iterator<Item = Result<String, MalformedReference>> + '_ {
    let containers = pod_spec.containers.iter().flat_map(move |container| {
        let env = container
            .env
            .iter()
            .flatten()
            .filter_map(move |var| kind.env_var_reference(container, var));
        let env_from = container
            .env_from
            .iter()
            .flatten()
            .filter_map(move |source| kind.env_from_reference(container, source));
        env.chain(env_from)
    });
    let volumes =
        pod_spec.volumes.iter().flatten().filter_map(move |volume| kind.volume_reference(volume));

    containers.chain(volumes)
}

impl ReferenceKind {
    fn env_var_reference(
        self,
        container: &Container,
        var: &EnvVar,
    ) -> Option<Result<String, MalformedReference>> {
        let source = var.value_from.as_ref()?;
        let name = match self {
            Self::ConfigMap => source.config_map_key_ref.as_ref()?.name.reference_name(),
            Self::Secret => source.secret_key_ref.as_ref()?.name.reference_name(),
            Self::Volume => return None,
        };
        Some(self.named(name, || format!("container `{}` env `{}`", container.name, var.name)))
    }

    fn env_from_reference(
        self,
        container: &Container,
        source: &EnvFromSource,
    ) -> Option<Result<String, MalformedReference>> {
        let name = match self {
            Self::ConfigMap => source.config_map_ref.as_ref()?.name.reference_name(),
            Self::Secret => source.secret_ref.as_ref()?.name.reference_name(),
            Self::Volume => return None,
        };
        Some(self.named(name, || format!("container `{}` envFrom", container.name)))
    }

    fn volume_reference(self, volume: &Volume) -> Option<Result<String, MalformedReference>> {
        let name = match self {
            Self::ConfigMap => volume.config_map.as_ref()?.name.reference_name(),
            Self::Secret => volume.secret.as_ref()?.secret_name.reference_name(),
            Self::Volume => {
                let plain = volume.config_map.is_none()
                    && volume.secret.is_none()
                    && !volume.name.is_empty();
                return plain.then(|| Ok(volume.name.clone()));
            }
        };
        Some(self.named(name, || format!("volume `{}`", volume.name)))
    }

    fn named<F>(self, name: Option<&str>, origin: F) -> Result<String, MalformedReference>
    where
        F: FnOnce() -> String,
    {
        name.map(ToString::to_string)
            .ok_or_else(|| MalformedReferenceSnafu { kind: self, origin: origin() }.build())
    }
}

/// Object names are `String` on some reference types and `Option<String>` on
/// others; both read as "no name" when empty.
trait ReferenceName {
    fn reference_name(&self) -> Option<&str>;
}

impl ReferenceName for String {
    fn reference_name(&self) -> Option<&str> { (!self.is_empty()).then_some(self.as_str()) }
}

impl ReferenceName for Option<String> {
    fn reference_name(&self) -> Option<&str> {
        self.as_deref().and_then(|name| (!name.is_empty()).then_some(name))
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{
        ConfigMapEnvSource, ConfigMapKeySelector, ConfigMapVolumeSource, EmptyDirVolumeSource,
        EnvVarSource, ObjectFieldSelector, SecretEnvSource, SecretKeySelector, SecretVolumeSource,
    };

    use super::*;

    fn config_map_env(var: &str, config_map: &str) -> EnvVar {
        EnvVar {
            name: var.to_string(),
            value_from: Some(EnvVarSource {
                config_map_key_ref: Some(ConfigMapKeySelector {
                    name: config_map.to_string(),
                    key: "key".to_string(),
                    ..ConfigMapKeySelector::default()
                }),
                ..EnvVarSource::default()
            }),
            ..EnvVar::default()
        }
    }

    fn secret_env(var: &str, secret: &str) -> EnvVar {
        EnvVar {
            name: var.to_string(),
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret.to_string(),
                    key: "key".to_string(),
                    ..SecretKeySelector::default()
                }),
                ..EnvVarSource::default()
            }),
            ..EnvVar::default()
        }
    }

    fn field_env(var: &str) -> EnvVar {
        EnvVar {
            name: var.to_string(),
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    field_path: "metadata.name".to_string(),
                    ..ObjectFieldSelector::default()
                }),
                ..EnvVarSource::default()
            }),
            ..EnvVar::default()
        }
    }

    fn config_map_env_from(config_map: &str) -> EnvFromSource {
        EnvFromSource {
            config_map_ref: Some(ConfigMapEnvSource {
                name: config_map.to_string(),
                ..ConfigMapEnvSource::default()
            }),
            ..EnvFromSource::default()
        }
    }

    fn secret_env_from(secret: &str) -> EnvFromSource {
        EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: secret.to_string(),
                ..SecretEnvSource::default()
            }),
            ..EnvFromSource::default()
        }
    }

    fn config_map_volume(name: &str, config_map: &str) -> Volume {
        Volume {
            name: name.to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: config_map.to_string(),
                ..ConfigMapVolumeSource::default()
            }),
            ..Volume::default()
        }
    }

    fn secret_volume(name: &str, secret: Option<&str>) -> Volume {
        Volume {
            name: name.to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: secret.map(ToString::to_string),
                ..SecretVolumeSource::default()
            }),
            ..Volume::default()
        }
    }

    fn empty_dir_volume(name: &str) -> Volume {
        Volume {
            name: name.to_string(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Volume::default()
        }
    }

    fn container(name: &str, env: Vec<EnvVar>, env_from: Vec<EnvFromSource>) -> Container {
        Container {
            name: name.to_string(),
            env: Some(env),
            env_from: Some(env_from),
            ..Container::default()
        }
    }

    fn names(pod_spec: &PodSpec, kind: ReferenceKind) -> Vec<String> {
        references(pod_spec, kind).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_config_maps_follow_env_then_env_from_then_volumes() {
        let pod_spec = PodSpec {
            containers: vec![container(
                "web",
                vec![config_map_env("A", "env-1"), field_env("POD"), config_map_env("B", "env-2")],
                vec![config_map_env_from("from-1"), config_map_env_from("from-2")],
            )],
            volumes: Some(vec![
                config_map_volume("cfg-1", "vol-1"),
                empty_dir_volume("scratch"),
                config_map_volume("cfg-2", "vol-2"),
                config_map_volume("cfg-3", "vol-3"),
            ]),
            ..PodSpec::default()
        };

        let config_maps = names(&pod_spec, ReferenceKind::ConfigMap);

        assert_eq!(config_maps, ["env-1", "env-2", "from-1", "from-2", "vol-1", "vol-2", "vol-3"]);
    }

    #[test]
    fn test_containers_are_visited_in_declaration_order() {
        let pod_spec = PodSpec {
            containers: vec![
                container(
                    "first",
                    vec![secret_env("A", "first-env")],
                    vec![secret_env_from("first-from")],
                ),
                container("second", vec![secret_env("B", "second-env")], vec![]),
            ],
            ..PodSpec::default()
        };

        assert_eq!(
            names(&pod_spec, ReferenceKind::Secret),
            ["first-env", "first-from", "second-env"]
        );
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let pod_spec = PodSpec {
            containers: vec![container(
                "web",
                vec![config_map_env("A", "shared"), config_map_env("B", "shared")],
                vec![config_map_env_from("shared")],
            )],
            ..PodSpec::default()
        };

        assert_eq!(names(&pod_spec, ReferenceKind::ConfigMap), ["shared", "shared", "shared"]);
    }

    #[test]
    fn test_references_of_other_kinds_are_ignored() {
        let pod_spec = PodSpec {
            containers: vec![container(
                "web",
                vec![secret_env("PASSWORD", "db"), field_env("POD")],
                vec![secret_env_from("tokens")],
            )],
            volumes: Some(vec![secret_volume("certs", Some("tls"))]),
            ..PodSpec::default()
        };

        assert!(names(&pod_spec, ReferenceKind::ConfigMap).is_empty());
        assert!(names(&pod_spec, ReferenceKind::Volume).is_empty());
        assert_eq!(names(&pod_spec, ReferenceKind::Secret), ["db", "tokens", "tls"]);
    }

    #[test]
    fn test_volume_kinds_partition_volumes() {
        let volumes = vec![
            config_map_volume("cfg", "settings"),
            empty_dir_volume("scratch"),
            secret_volume("certs", Some("tls")),
            empty_dir_volume("cache"),
            config_map_volume("extra", "extra-settings"),
        ];
        let pod_spec = PodSpec { volumes: Some(volumes.clone()), ..PodSpec::default() };

        let config_maps = names(&pod_spec, ReferenceKind::ConfigMap);
        let secrets = names(&pod_spec, ReferenceKind::Secret);
        let plain = names(&pod_spec, ReferenceKind::Volume);

        assert_eq!(config_maps, ["settings", "extra-settings"]);
        assert_eq!(secrets, ["tls"]);
        assert_eq!(plain, ["scratch", "cache"]);
        assert_eq!(config_maps.len() + secrets.len() + plain.len(), volumes.len());
    }

    #[test]
    fn test_plain_volume_without_name_is_skipped() {
        let pod_spec = PodSpec {
            volumes: Some(vec![empty_dir_volume(""), empty_dir_volume("data")]),
            ..PodSpec::default()
        };

        assert_eq!(names(&pod_spec, ReferenceKind::Volume), ["data"]);
    }

    #[test]
    fn test_malformed_references_keep_their_position() {
        let pod_spec = PodSpec {
            containers: vec![container(
                "web",
                vec![secret_env("A", ""), secret_env("B", "api-key")],
                vec![],
            )],
            volumes: Some(vec![secret_volume("certs", None)]),
            ..PodSpec::default()
        };

        let found = references(&pod_spec, ReferenceKind::Secret).collect::<Vec<_>>();

        assert_eq!(found.len(), 3);
        assert_eq!(
            found[0].as_ref().unwrap_err().to_string(),
            "Secret reference in container `web` env `A` does not name a resource"
        );
        assert_eq!(found[1].as_deref(), Ok("api-key"));
        assert_eq!(
            found[2].as_ref().unwrap_err().to_string(),
            "Secret reference in volume `certs` does not name a resource"
        );
    }

    #[test]
    fn test_round_trip_counts() {
        let (n, m, k) = (3, 2, 4);
        let pod_spec = PodSpec {
            containers: vec![container(
                "web",
                (0..n).map(|i| config_map_env(&format!("VAR_{i}"), &format!("env-{i}"))).collect(),
                (0..m).map(|i| config_map_env_from(&format!("from-{i}"))).collect(),
            )],
            volumes: Some(
                (0..k).map(|i| config_map_volume(&format!("v{i}"), &format!("vol-{i}"))).collect(),
            ),
            ..PodSpec::default()
        };

        let expected = (0..n)
            .map(|i| format!("env-{i}"))
            .chain((0..m).map(|i| format!("from-{i}")))
            .chain((0..k).map(|i| format!("vol-{i}")))
            .collect::<Vec<_>>();

        assert_eq!(names(&pod_spec, ReferenceKind::ConfigMap), expected);
    }

    #[test]
    fn test_empty_pod_spec() {
        let pod_spec = PodSpec::default();

        for kind in [ReferenceKind::ConfigMap, ReferenceKind::Secret, ReferenceKind::Volume] {
            assert_eq!(references(&pod_spec, kind).count(), 0);
        }
    }
}
