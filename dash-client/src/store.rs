use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use kube::api::TypeMeta;
use kube::discovery::{self, Scope};
use kube::runtime::reflector::store::Writer;
use kube::runtime::reflector::Store;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{
    api::{Api, ApiResource, DynamicObject, GroupVersionKind, ResourceExt},
    Client,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::describer::ResourceKey;
use crate::error::StoreError;

/// Where a query looks: the whole cluster or a single namespace.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum QueryScope {
    Cluster,
    Namespace(String),
}

impl QueryScope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            QueryScope::Cluster => None,
            QueryScope::Namespace(ns) => Some(ns),
        }
    }
}

impl fmt::Display for QueryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryScope::Cluster => f.write_str("<cluster>"),
            QueryScope::Namespace(ns) => f.write_str(ns),
        }
    }
}

/// Read-only source of Kubernetes objects used by resource describers.
///
/// Implementations own their retry and timeout policy.
pub trait ObjectStore: Send + Sync {
    fn query<'a>(
        &'a self,
        key: &'a ResourceKey,
        scope: &'a QueryScope,
    ) -> BoxFuture<'a, Result<Vec<DynamicObject>, StoreError>>;
}

/// Key for a watcher: the resource type and the scope it watches.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct WatchKey {
    key: ResourceKey,
    scope: QueryScope,
}

#[derive(Debug)]
struct WatcherState {
    store: Store<DynamicObject>,
    task: JoinHandle<()>,
}

const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// [`ObjectStore`] backed by kube reflectors, one per (resource, scope).
///
/// The first query for a pair starts a watcher and waits for its initial
/// list; later queries read the reflector cache.
pub struct KubeStore {
    client: Client,
    sync_timeout: Duration,
    watchers: RwLock<HashMap<WatchKey, WatcherState>>,
    ar_cache: RwLock<HashMap<GroupVersionKind, (ApiResource, Scope)>>,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            watchers: RwLock::new(HashMap::new()),
            ar_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Resolve ApiResource and Scope through discovery, once per kind.
    async fn resolve_ar_and_scope(
        &self,
        gvk: &GroupVersionKind,
    ) -> Result<(ApiResource, Scope), StoreError> {
        {
            let cache = self.ar_cache.read().await;
            if let Some((ar, scope)) = cache.get(gvk) {
                return Ok((ar.clone(), scope.clone()));
            }
        }

        let (ar, caps) = discovery::pinned_kind(&self.client, gvk)
            .await
            .map_err(|e| StoreError::Discovery {
                kind: gvk.kind.clone(),
                reason: e.to_string(),
            })?;
        let scope = caps.scope.clone();

        self.ar_cache
            .write()
            .await
            .insert(gvk.clone(), (ar.clone(), scope.clone()));

        Ok((ar, scope))
    }

    async fn cached(&self, watch_key: &WatchKey) -> Option<Store<DynamicObject>> {
        let watchers = self.watchers.read().await;
        watchers.get(watch_key).map(|state| state.store.clone())
    }

    #[tracing::instrument(skip_all, fields(kind = %key.kind, scope = %scope))]
    async fn start_reflector(
        &self,
        key: &ResourceKey,
        scope: &QueryScope,
    ) -> Result<Store<DynamicObject>, StoreError> {
        let gvk = key.gvk();
        let (ar, kind_scope) = self.resolve_ar_and_scope(&gvk).await?;

        let api: Api<DynamicObject> = match (&kind_scope, scope) {
            (Scope::Namespaced, QueryScope::Namespace(ns)) => {
                Api::namespaced_with(self.client.clone(), ns, &ar)
            }
            _ => Api::all_with(self.client.clone(), &ar),
        };

        let config = watcher::Config::default().page_size(500).timeout(20);
        let writer: Writer<DynamicObject> = Writer::new(ar.clone());
        let reader: Store<DynamicObject> = writer.as_reader();

        let ar_api_version = ar.api_version.clone();
        let ar_kind = ar.kind.clone();

        let stream = watcher(api, config)
            .modify(move |resource| {
                resource.managed_fields_mut().clear();
                if resource.types.is_none() {
                    resource.types = Some(TypeMeta {
                        kind: ar_kind.clone(),
                        api_version: ar_api_version.clone(),
                    });
                }
            })
            .default_backoff()
            .reflect(writer);

        let task = tokio::spawn(async move {
            stream.for_each(|_| futures::future::ready(())).await;
        });

        info!(kind = %key.kind, scope = %scope, "waiting for initial watcher sync");

        match tokio::time::timeout(self.sync_timeout, reader.wait_until_ready()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                task.abort();
                return Err(StoreError::Backend(format!(
                    "watcher for {} stopped before sync: {}",
                    key, e
                )));
            }
            Err(_elapsed) => {
                task.abort();
                return Err(StoreError::Backend(format!(
                    "timed out after {:?} waiting for {} to sync",
                    self.sync_timeout, key
                )));
            }
        }

        let watch_key = WatchKey {
            key: key.clone(),
            scope: scope.clone(),
        };
        let mut watchers = self.watchers.write().await;
        if let Some(existing) = watchers.get(&watch_key) {
            // Lost a race with a concurrent first query.
            debug!(kind = %key.kind, scope = %scope, "reusing concurrently started watcher");
            task.abort();
            return Ok(existing.store.clone());
        }
        watchers.insert(
            watch_key,
            WatcherState {
                store: reader.clone(),
                task,
            },
        );
        Ok(reader)
    }

    /// Abort all live watchers and forget their caches.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        let mut watchers = self.watchers.write().await;
        for (_, state) in watchers.drain() {
            state.task.abort();
        }
    }
}

impl Drop for KubeStore {
    fn drop(&mut self) {
        for (_, state) in self.watchers.get_mut().drain() {
            state.task.abort();
        }
    }
}

/// Objects in `store` visible from `scope`. Cluster-scoped objects carry no
/// namespace and are always visible.
fn read_scoped(store: &Store<DynamicObject>, scope: &QueryScope) -> Vec<DynamicObject> {
    store
        .state()
        .par_iter()
        .filter(|arc_obj| match (scope.namespace(), arc_obj.namespace()) {
            (Some(wanted), Some(ns)) => ns == wanted,
            _ => true,
        })
        .map(|arc_obj| arc_obj.as_ref().clone())
        .collect()
}

impl ObjectStore for KubeStore {
    fn query<'a>(
        &'a self,
        key: &'a ResourceKey,
        scope: &'a QueryScope,
    ) -> BoxFuture<'a, Result<Vec<DynamicObject>, StoreError>> {
        async move {
            let watch_key = WatchKey {
                key: key.clone(),
                scope: scope.clone(),
            };
            let store = match self.cached(&watch_key).await {
                Some(store) => store,
                None => self.start_reflector(key, scope).await?,
            };
            Ok(read_scoped(&store, scope))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::serde_json::{self, json};
    use kube::runtime::watcher::Event;

    fn config_map(ns: Option<&str>, name: &str) -> DynamicObject {
        let mut metadata = json!({"name": name});
        if let Some(ns) = ns {
            metadata["namespace"] = json!(ns);
        }
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": metadata,
        }))
        .unwrap()
    }

    fn populated_store(objects: Vec<DynamicObject>) -> Store<DynamicObject> {
        let ar = ApiResource::from_gvk(&GroupVersionKind::gvk("", "v1", "ConfigMap"));
        let mut writer: Writer<DynamicObject> = Writer::new(ar);
        let reader = writer.as_reader();
        for obj in objects {
            writer.apply_watcher_event(&Event::Apply(obj));
        }
        reader
    }

    #[test]
    fn namespace_scope_keeps_matching_and_cluster_objects() {
        let store = populated_store(vec![
            config_map(Some("default"), "a"),
            config_map(Some("kube-system"), "b"),
            config_map(None, "global"),
        ]);

        let mut names: Vec<String> =
            read_scoped(&store, &QueryScope::Namespace("default".into()))
                .iter()
                .map(|o| o.name_any())
                .collect();
        names.sort();
        assert_eq!(names, vec!["a", "global"]);
    }

    #[test]
    fn cluster_scope_returns_everything() {
        let store = populated_store(vec![
            config_map(Some("default"), "a"),
            config_map(Some("kube-system"), "b"),
        ]);
        assert_eq!(read_scoped(&store, &QueryScope::Cluster).len(), 2);
    }

    #[test]
    fn scope_display() {
        assert_eq!(QueryScope::Cluster.to_string(), "<cluster>");
        assert_eq!(QueryScope::Namespace("default".into()).to_string(), "default");
        assert_eq!(QueryScope::Cluster.namespace(), None);
    }
}
