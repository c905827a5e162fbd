//! Resource cache: at most one fetch in flight per operation and parameters.
//!
//! Every [`Resource`] resolved for the same [`CacheKey`] shares one entry. The
//! entry holds a shared future, so concurrent `value()` calls await the same
//! request and see the same result or error.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde_json::Value;
use tracing::debug;

use crate::error::OperatorError;
use crate::key::CacheKey;
use crate::operator::{Operator, OperatorRegistry, handle_response};

type SharedFetch = Shared<BoxFuture<'static, Result<Value, OperatorError>>>;
type Entries = Arc<Mutex<HashMap<CacheKey, Entry>>>;

struct Entry {
    fetch: SharedFetch,
    override_value: Option<Value>,
    generation: u64,
}

impl Entry {
    fn new(operator: &Arc<dyn Operator>, parameters: &Value) -> Self {
        Entry {
            fetch: fetch(operator, parameters),
            override_value: None,
            generation: 0,
        }
    }
}

fn fetch(operator: &Arc<dyn Operator>, parameters: &Value) -> SharedFetch {
    let call = operator.call(parameters.clone());
    async move { handle_response(call.await?) }.boxed().shared()
}

fn lock(entries: &Mutex<HashMap<CacheKey, Entry>>) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared entries keyed by operation and parameters.
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct ResourceCache {
    registry: Arc<OperatorRegistry>,
    entries: Entries,
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("registry", &self.registry)
            .field("entries", &self.len())
            .finish()
    }
}

impl ResourceCache {
    /// Empty cache resolving operators from `registry`.
    pub fn new(registry: OperatorRegistry) -> Self {
        ResourceCache {
            registry: Arc::new(registry),
            entries: Arc::default(),
        }
    }

    /// Operators this cache resolves from.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// Resource for `operation_id` called with `parameters`.
    ///
    /// The first resolution of a key creates its entry; the request itself
    /// only starts once a [`Resource::value`] is awaited.
    pub fn resolve_operator(
        &self,
        operation_id: &str,
        parameters: Value,
    ) -> Result<Resource, OperatorError> {
        let operator =
            self.registry
                .get(operation_id)
                .ok_or_else(|| OperatorError::OperatorNotFound {
                    operation_id: operation_id.to_string(),
                    parameters: parameters.clone(),
                })?;
        let key = CacheKey::new(operation_id, &parameters);

        lock(&self.entries).entry(key.clone()).or_insert_with(|| {
            debug!(key = %key, "Creating cache entry.");
            Entry::new(&operator, &parameters)
        });

        Ok(Resource {
            key,
            parameters,
            operator,
            entries: Arc::clone(&self.entries),
        })
    }

    /// Drop one entry. Outstanding resources recreate it on their next read.
    pub fn evict(&self, key: &CacheKey) -> bool {
        lock(&self.entries).remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// True when no entry is live.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

/// Handle on one cache entry.
pub struct Resource {
    key: CacheKey,
    parameters: Value,
    operator: Arc<dyn Operator>,
    entries: Entries,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("key", &self.key)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl Resource {
    /// Key of the backing entry.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Parameters the resource was resolved with.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Optimistic value if one was set, otherwise the shared fetch.
    pub async fn value(&self) -> Result<Value, OperatorError> {
        let fetch = {
            let mut entries = lock(&self.entries);
            let entry = entries
                .entry(self.key.clone())
                .or_insert_with(|| Entry::new(&self.operator, &self.parameters));
            if let Some(value) = &entry.override_value {
                return Ok(value.clone());
            }
            entry.fetch.clone()
        };
        fetch.await
    }

    /// Overwrite the value every holder of this key sees, without a request.
    pub fn mutate(&self, value: Value) {
        let mut entries = lock(&self.entries);
        let entry = entries
            .entry(self.key.clone())
            .or_insert_with(|| Entry::new(&self.operator, &self.parameters));
        entry.override_value = Some(value);
    }

    /// Start a new fetch that supersedes the current one and any override.
    pub async fn refetch(&self) -> Result<Value, OperatorError> {
        let next = fetch(&self.operator, &self.parameters);
        {
            let mut entries = lock(&self.entries);
            let entry = entries
                .entry(self.key.clone())
                .or_insert_with(|| Entry::new(&self.operator, &self.parameters));
            entry.fetch = next.clone();
            entry.override_value = None;
            entry.generation += 1;
            debug!(key = %self.key, generation = entry.generation, "Refetching.");
        }
        next.await
    }

    /// Number of refetches since the entry was created.
    pub fn generation(&self) -> u64 {
        lock(&self.entries)
            .get(&self.key)
            .map_or(0, |entry| entry.generation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::operator::ApiResponse;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_registry(status: u16) -> (OperatorRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = OperatorRegistry::new();
        registry.register("findOne", move |parameters: Value| {
            let counter = Arc::clone(&counter);
            async move {
                let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, TransportError>(ApiResponse {
                    status,
                    data: json!({ "id": parameters["id"], "call": call }),
                })
            }
        });
        (registry, calls)
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let (registry, calls) = counting_registry(200);
        let cache = ResourceCache::new(registry);

        let first = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        let second = cache.resolve_operator("find-one", json!({ "id": 1 })).unwrap();
        let (a, b) = tokio::join!(first.value(), second.value());

        assert_eq!(a.unwrap(), json!({ "id": 1, "call": 1 }));
        assert_eq!(b.unwrap(), json!({ "id": 1, "call": 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        let later = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        assert_eq!(later.value().await.unwrap()["call"], 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_parameters_get_separate_entries() {
        let (registry, calls) = counting_registry(200);
        let cache = ResourceCache::new(registry);

        let one = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        let two = cache.resolve_operator("findOne", json!({ "id": 2 })).unwrap();
        let (a, b) = tokio::join!(one.value(), two.value());

        assert_eq!(a.unwrap()["id"], 1);
        assert_eq!(b.unwrap()["id"], 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn mutate_is_seen_by_every_holder() {
        let (registry, calls) = counting_registry(200);
        let cache = ResourceCache::new(registry);

        let first = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        let second = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        first.mutate(json!({ "id": 1, "title": "draft" }));

        assert_eq!(second.value().await.unwrap()["title"], "draft");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refetch_supersedes_value_and_override() {
        let (registry, calls) = counting_registry(200);
        let cache = ResourceCache::new(registry);
        let resource = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();

        assert_eq!(resource.value().await.unwrap()["call"], 1);
        resource.mutate(json!("optimistic"));
        assert_eq!(resource.refetch().await.unwrap()["call"], 2);
        assert_eq!(resource.value().await.unwrap()["call"], 2);
        assert_eq!(resource.generation(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn evicted_entries_are_fetched_again() {
        let (registry, calls) = counting_registry(200);
        let cache = ResourceCache::new(registry);
        let resource = cache.resolve_operator("findOne", json!({ "id": 1 })).unwrap();
        resource.value().await.unwrap();

        assert!(cache.evict(resource.key()));
        assert!(!cache.evict(resource.key()));
        assert!(cache.is_empty());

        assert_eq!(resource.value().await.unwrap()["call"], 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let cache = ResourceCache::new(OperatorRegistry::new());
        let err = cache
            .resolve_operator("findMany", json!({ "page": 2 }))
            .unwrap_err();

        assert!(matches!(
            err,
            OperatorError::OperatorNotFound { ref operation_id, ref parameters }
                if operation_id == "findMany" && parameters["page"] == 2
        ));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn rejections_reach_every_awaiter() {
        let (registry, calls) = counting_registry(404);
        let cache = ResourceCache::new(registry);
        let first = cache.resolve_operator("findOne", json!({ "id": 7 })).unwrap();
        let second = cache.resolve_operator("findOne", json!({ "id": 7 })).unwrap();

        let (a, b) = tokio::join!(first.value(), second.value());

        assert!(matches!(a, Err(OperatorError::Rejected { status: 404, .. })));
        assert!(matches!(b, Err(OperatorError::Rejected { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
