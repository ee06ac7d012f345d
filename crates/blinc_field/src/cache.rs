//! Keyed request cache
//!
//! Maps a [`RequestKey`] to its last response and, while a request runs, to
//! the in-flight call. Starting a request for a key that already has one in
//! flight joins it instead of issuing a duplicate, so at most one request
//! per key runs process-wide.
//!
//! Entries are reference counted: resolvers [`acquire`](RequestCache::acquire)
//! every key they observe and release them on unmount. An entry whose last
//! lease is released is removed. A response only lands in the entry that
//! issued it: once that entry is deleted or its request replaced, the
//! response is dropped.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::FetchError;
use crate::option::SelectOption;
use crate::request::OptionsFuture;

/// Shared response payload
pub type SharedOptions = Arc<Vec<SelectOption>>;

/// Result of one request, as delivered to every joined resolver
pub type FetchOutcome = Result<SharedOptions, FetchError>;

/// Composite identity of a request: `(instance, params, keyword)`
///
/// Equality is deep; JSON objects in `params` compare independent of key
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestKey {
    pub instance_id: String,
    pub params: Value,
    pub keyword: Option<String>,
}

impl RequestKey {
    pub fn new(instance_id: impl Into<String>, params: Value, keyword: Option<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            params,
            keyword,
        }
    }
}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instance_id.hash(state);
        hash_json(&self.params, state);
        self.keyword.hash(state);
    }
}

/// Hash JSON consistently with its (order-insensitive) equality
fn hash_json<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => n.hash(state),
        Value::String(s) => s.hash(state),
        Value::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_json(item, state);
            }
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries.len().hash(state);
            for (key, item) in entries {
                key.hash(state);
                hash_json(item, state);
            }
        }
    }
}

struct PendingRequest {
    id: u64,
    rx: watch::Receiver<Option<FetchOutcome>>,
}

#[derive(Default)]
struct CacheEntry {
    data: Option<SharedOptions>,
    in_flight: Option<PendingRequest>,
    leases: usize,
}

/// Handle on a running request
pub struct InFlight {
    rx: watch::Receiver<Option<FetchOutcome>>,
}

impl InFlight {
    /// Wait for the request to finish
    pub async fn wait(mut self) -> FetchOutcome {
        let outcome = match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(FetchError::Request(
                "request task ended without a result".to_string(),
            ))
        })
    }
}

/// Shared, cloneable request cache
#[derive(Clone, Default)]
pub struct RequestCache {
    entries: Arc<Mutex<FxHashMap<RequestKey, CacheEntry>>>,
    next_request: Arc<AtomicU64>,
}

static GLOBAL_CACHE: LazyLock<RequestCache> = LazyLock::new(RequestCache::new);

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by resolvers mounted without an explicit one
    pub fn global() -> Self {
        GLOBAL_CACHE.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<RequestKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached response for `key`
    pub fn get(&self, key: &RequestKey) -> Option<SharedOptions> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    /// Whether a request for `key` is running
    pub fn is_pending(&self, key: &RequestKey) -> bool {
        self.lock()
            .get(key)
            .and_then(|entry| entry.in_flight.as_ref())
            .is_some_and(|pending| pending.rx.has_changed().is_ok())
    }

    /// Overwrite the cached response without issuing a request
    pub fn set(&self, key: &RequestKey, data: Vec<SelectOption>) {
        self.lock().entry(key.clone()).or_default().data = Some(Arc::new(data));
    }

    /// Remove the entry for `key`, forgetting any in-flight request
    pub fn delete(&self, key: &RequestKey) {
        if self.lock().remove(key).is_some() {
            tracing::debug!(keyword = ?key.keyword, "request cache entry deleted");
        }
    }

    /// Register interest in `key`
    pub fn acquire(&self, key: &RequestKey) {
        self.lock().entry(key.clone()).or_default().leases += 1;
    }

    /// Drop interest in `key`; the entry goes away with its last lease
    pub fn release(&self, key: &RequestKey) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.leases = entry.leases.saturating_sub(1);
            if entry.leases == 0 {
                entries.remove(key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Start a request for `key`, or join the one already running
    ///
    /// `start` is only invoked when no live request exists for the key. The
    /// request runs on its own task, so it completes (and is stored) even if
    /// every waiter goes away. Must be called within a tokio runtime.
    pub fn fetch<F>(&self, key: &RequestKey, start: F) -> InFlight
    where
        F: FnOnce() -> OptionsFuture,
    {
        let (id, tx) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();
            if let Some(pending) = &entry.in_flight {
                // A closed channel means the request task died; start over
                if pending.rx.has_changed().is_ok() {
                    tracing::debug!(keyword = ?key.keyword, "joining in-flight request");
                    return InFlight {
                        rx: pending.rx.clone(),
                    };
                }
            }
            let id = self.next_request.fetch_add(1, Ordering::Relaxed);
            let (tx, rx) = watch::channel(None);
            entry.in_flight = Some(PendingRequest { id, rx });
            (id, tx)
        };

        tracing::debug!(keyword = ?key.keyword, request = id, "issuing option request");
        let rx = tx.subscribe();
        let future = start();
        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let outcome = future.await.map(Arc::new);
            cache.complete(&key, id, &outcome);
            tx.send_replace(Some(outcome));
        });
        InFlight { rx }
    }

    fn complete(&self, key: &RequestKey, id: u64, outcome: &FetchOutcome) {
        let mut entries = self.lock();
        let entry = entries
            .get_mut(key)
            .filter(|entry| entry.in_flight.as_ref().is_some_and(|pending| pending.id == id));
        let Some(entry) = entry else {
            tracing::trace!(keyword = ?key.keyword, request = id, "orphaned response dropped");
            return;
        };
        entry.in_flight = None;
        match outcome {
            Ok(data) => entry.data = Some(data.clone()),
            // Keep whatever was cached before
            Err(_) => {}
        }
    }
}
