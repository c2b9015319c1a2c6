//! Resolves the resources associated with a Deployment.
//!
//! After the Deployment itself is fetched, five tasks run concurrently, one
//! per [`Category`]. The Service and ReplicaSet tasks each answer with a
//! single value over a `oneshot` channel. The ConfigMap, Secret and Volume
//! tasks stream every name they discover over an `mpsc` channel and finish by
//! closing it. The caller drains the channels in report order, so each list
//! keeps the order its task produced it in.
//!
//! Only the Deployment fetch and selector derivation are fatal. Anything that
//! goes wrong inside a category task is recorded as a [`Warning`] and leaves
//! the other categories untouched.

mod error;
mod resolution;

use std::{collections::HashSet, sync::Arc, time::Duration};

use k8s_openapi::api::core::v1::PodSpec;
use kube::ResourceExt;
use snafu::ResultExt;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinSet,
    time::Instant,
};
use tokio_util::{sync::CancellationToken, task::AbortOnDropHandle};

pub use self::{
    error::Error,
    resolution::{Category, DeploymentRef, Resolution, Warning},
};
use crate::{
    consts,
    ext::DeploymentExt,
    extractor::{self, MalformedReference, ReferenceKind},
    provider::{self, ResourceProvider},
};

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

type Lookup = Result<Option<String>, Warning>;

type References = mpsc::UnboundedReceiver<Result<String, MalformedReference>>;

#[derive(Clone, Copy, Debug)]
pub struct ResolveOptions {
    /// Upper bound on the whole resolution, Deployment fetch included.
    pub timeout: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self { Self { timeout: consts::DEFAULT_RESOLVE_TIMEOUT } }
}

pub struct Resolver<P> {
    provider: P,
    options: ResolveOptions,
}

impl<P> Resolver<P>
where
    P: ResourceProvider,
{
    pub const fn new(provider: P, options: ResolveOptions) -> Self { Self { provider, options } }

    /// Resolves the Service, ReplicaSet, ConfigMaps, Secrets and Volumes of
    /// `target`.
    ///
    /// Returns once every category task has reported. When the deadline in
    /// [`ResolveOptions`] passes, outstanding lookups are cancelled and
    /// reported as warnings. Dropping the returned future aborts all tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the Deployment cannot be fetched within the
    /// deadline, or if its label selector is invalid.
    pub async fn resolve(&self, target: &DeploymentRef) -> Result<Resolution, Error> {
        let DeploymentRef { name, namespace } = target;
        let timeout = self.options.timeout;
        let deadline = deadline_after(timeout);

        let deployment =
            tokio::time::timeout_at(deadline, self.provider.get_deployment(namespace, name))
                .await
                .map_err(|_| Error::DeploymentTimedOut {
                    namespace: namespace.clone(),
                    name: name.clone(),
                    timeout,
                })?
                .context(error::GetDeploymentSnafu)?;
        let selector: Arc<str> = deployment
            .label_selector()
            .with_context(|_| error::DeriveSelectorSnafu {
                namespace: namespace.clone(),
                name: name.clone(),
            })?
            .to_string()
            .into();
        let pod_spec = Arc::new(deployment.pod_spec().cloned().unwrap_or_default());
        tracing::debug!("Resolving deployment {namespace}/{name} with selector '{selector}'");

        let cancel = CancellationToken::new();
        let _watchdog = AbortOnDropHandle::new(tokio::spawn(cancel_at(deadline, cancel.clone())));
        let mut tasks = JoinSet::new();

        let service = {
            let provider = self.provider.clone();
            let namespace = namespace.clone();
            let selector = Arc::clone(&selector);
            spawn_lookup(&mut tasks, Category::Service, cancel.child_token(), async move {
                provider.list_services(&namespace, &selector).await
            })
        };
        let replica_set = {
            let provider = self.provider.clone();
            let namespace = namespace.clone();
            let selector = Arc::clone(&selector);
            spawn_lookup(&mut tasks, Category::ReplicaSet, cancel.child_token(), async move {
                provider.list_replica_sets(&namespace, &selector).await
            })
        };
        let config_maps = spawn_references(&mut tasks, ReferenceKind::ConfigMap, &pod_spec);
        let secrets = spawn_references(&mut tasks, ReferenceKind::Secret, &pod_spec);
        let volumes = spawn_references(&mut tasks, ReferenceKind::Volume, &pod_spec);

        let mut collector = Collector::default();
        let service = collector.receive_lookup(Category::Service, service).await;
        let replica_set = collector.receive_lookup(Category::ReplicaSet, replica_set).await;
        let config_maps = collector.drain_references(Category::ConfigMap, config_maps).await;
        let secrets = collector.drain_references(Category::Secret, secrets).await;
        let volumes = collector.drain_references(Category::Volume, volumes).await;
        let warnings = collector.join(tasks).await;

        Ok(Resolution {
            deployment: target.clone(),
            service,
            replica_set,
            config_maps,
            secrets,
            volumes,
            warnings,
        })
    }
}

/// `timeout` from now. Timeouts too large for `Instant` end about thirty
/// years out.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

async fn cancel_at(deadline: Instant, cancel: CancellationToken) {
    tokio::time::sleep_until(deadline).await;
    tracing::debug!("Resolution deadline exceeded, cancelling outstanding lookups");
    cancel.cancel();
}

fn spawn_lookup<K, F>(
    tasks: &mut JoinSet<Category>,
    category: Category,
    cancel: CancellationToken,
    lookup: F,
) -> oneshot::Receiver<Lookup>
where
    K: kube::Resource + Send,
    F: Future<Output = Result<Vec<K>, provider::Error>> + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let _handle = tasks.spawn(async move {
        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                Err(Warning::new(category, "lookup cancelled, resolution deadline exceeded"))
            }
            result = lookup => result
                .map(|items| {
                    if items.len() > 1 {
                        tracing::debug!("{} {category} matches, using the first", items.len());
                    }
                    items.first().map(ResourceExt::name_any)
                })
                .map_err(|err| Warning::new(category, err.to_string())),
        };
        if sender.send(outcome).is_err() {
            tracing::debug!("{category} lookup finished after the resolution was abandoned");
        }
        category
    });
    receiver
}

fn spawn_references(
    tasks: &mut JoinSet<Category>,
    kind: ReferenceKind,
    pod_spec: &Arc<PodSpec>,
) -> References {
    let (sender, receiver) = mpsc::unbounded_channel();
    let pod_spec = Arc::clone(pod_spec);
    let _handle = tasks.spawn(async move {
        for reference in extractor::references(&pod_spec, kind) {
            if sender.send(reference).is_err() {
                break;
            }
        }
        Category::from(kind)
    });
    receiver
}

#[derive(Default)]
struct Collector {
    warnings: Vec<Warning>,
}

impl Collector {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    async fn receive_lookup(
        &mut self,
        category: Category,
        receiver: oneshot::Receiver<Lookup>,
    ) -> Option<String> {
        match receiver.await {
            Ok(Ok(name)) => {
                if name.is_none() {
                    tracing::info!("No {category} matches the deployment selector");
                }
                name
            }
            Ok(Err(warning)) => {
                self.warn(warning);
                None
            }
            // The task went away without answering, `join` reports it.
            Err(_) => None,
        }
    }

    async fn drain_references(
        &mut self,
        category: Category,
        mut receiver: References,
    ) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(reference) = receiver.recv().await {
            match reference {
                Ok(name) => names.push(name),
                Err(malformed) => self.warn(Warning::new(category, format!("skipped {malformed}"))),
            }
        }
        names
    }

    /// Waits for every task to exit and reports the ones that did not finish.
    async fn join(mut self, mut tasks: JoinSet<Category>) -> Vec<Warning> {
        let mut finished = HashSet::with_capacity(Category::ALL.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(category) => {
                    let _ = finished.insert(category);
                }
                Err(err) => tracing::error!("Resolution task failed, error: {err}"),
            }
        }
        for category in Category::ALL {
            if !finished.contains(&category) {
                self.warn(Warning::new(category, "resolution task did not complete"));
            }
        }
        self.warnings
    }
}
