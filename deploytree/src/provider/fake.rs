//! In-memory [`ResourceProvider`] and Deployment fixtures for tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec, ReplicaSet},
        core::v1::{
            ConfigMapEnvSource, ConfigMapVolumeSource, Container, EnvFromSource, EnvVar,
            EnvVarSource, PodSpec, PodTemplateSpec, SecretKeySelector, Service, Volume,
        },
    },
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta},
};

use super::{Error, ResourceProvider};

#[derive(Clone, Default)]
pub struct FakeProvider {
    pub deployment: Option<Deployment>,
    pub services: Vec<Service>,
    pub replica_sets: Vec<ReplicaSet>,
    pub fail_services: bool,
    pub deployment_delay: Duration,
    pub list_delay: Duration,
    pub selectors: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment: Some(deployment),
            services: vec![named("web-svc")],
            replica_sets: vec![named("web-7f9c")],
            ..Self::default()
        }
    }
}

impl ResourceProvider for FakeProvider {
    fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Deployment, Error>> + Send {
        let found = self.deployment.clone().filter(|deployment| {
            deployment.metadata.name.as_deref() == Some(name)
                && deployment.metadata.namespace.as_deref() == Some(namespace)
        });
        let delay = self.deployment_delay;
        let (namespace, name) = (namespace.to_string(), name.to_string());
        async move {
            tokio::time::sleep(delay).await;
            found.ok_or(Error::DeploymentNotFound { namespace, name })
        }
    }

    fn list_services(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Service>, Error>> + Send {
        self.selectors.lock().unwrap().push(selector.to_string());
        let result = if self.fail_services {
            Err(Error::ListServices {
                namespace: namespace.to_string(),
                selector: selector.to_string(),
                source: Box::new(kube::Error::Service(Box::new(std::io::Error::other(
                    "connection refused",
                )))),
            })
        } else {
            Ok(self.services.clone())
        };
        let delay = self.list_delay;
        async move {
            tokio::time::sleep(delay).await;
            result
        }
    }

    fn list_replica_sets(
        &self,
        _namespace: &str,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<ReplicaSet>, Error>> + Send {
        self.selectors.lock().unwrap().push(selector.to_string());
        let replica_sets = self.replica_sets.clone();
        async move { Ok(replica_sets) }
    }
}

pub fn named<K>(name: &str) -> K
where
    K: kube::Resource<DynamicType = ()> + Default,
{
    let mut resource = K::default();
    resource.meta_mut().name = Some(name.to_string());
    resource
}

pub fn deployment(pod_spec: PodSpec) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some("web".to_string()),
            namespace: Some("default".to_string()),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(BTreeMap::from([("app".to_string(), "web".to_string())])),
                ..LabelSelector::default()
            },
            template: PodTemplateSpec { spec: Some(pod_spec), ..PodTemplateSpec::default() },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    }
}

pub fn web_pod_spec() -> PodSpec {
    PodSpec {
        containers: vec![Container {
            name: "web".to_string(),
            env: Some(vec![EnvVar {
                name: "EnvRef".to_string(),
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: "web-sec".to_string(),
                        key: "token".to_string(),
                        ..SecretKeySelector::default()
                    }),
                    ..EnvVarSource::default()
                }),
                ..EnvVar::default()
            }]),
            env_from: Some(vec![EnvFromSource {
                config_map_ref: Some(ConfigMapEnvSource {
                    name: "web-cfg".to_string(),
                    ..ConfigMapEnvSource::default()
                }),
                ..EnvFromSource::default()
            }]),
            ..Container::default()
        }],
        volumes: Some(vec![Volume {
            name: "config".to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: "web-vol-cfg".to_string(),
                ..ConfigMapVolumeSource::default()
            }),
            ..Volume::default()
        }]),
        ..PodSpec::default()
    }
}
