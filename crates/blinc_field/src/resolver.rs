//! Async option resolver
//!
//! One [`OptionResolver`] backs one select field. It owns the field's keyword,
//! static options and remote data, and turns keyword/params changes into
//! debounced, de-duplicated requests through the shared [`RequestCache`].
//!
//! # Lifecycle
//!
//! - [`OptionResolver::mount`] seeds the static options and, when a request
//!   function is configured, immediately resolves the initial key.
//! - [`fetch_data`](OptionResolver::fetch_data) and
//!   [`set_params`](OptionResolver::set_params) write state right away; the
//!   effective request key is recomputed after `debounce_time` of quiet.
//! - Responses are applied only while their key is still the active one.
//! - Dropping the resolver aborts its tasks and releases its cache leases.
//!
//! # Example
//!
//! ```ignore
//! use blinc_field::prelude::*;
//!
//! let resolver = OptionResolver::mount(
//!     FieldConfig::new().debounce_time(300).field_key("assignee"),
//!     Some(users_request),
//! );
//! resolver.fetch_data(Some("ad"));
//!
//! let mut updates = resolver.subscribe();
//! updates.wait_for(|s| !s.loading).await?;
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rustc_hash::FxHashSet;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

use crate::cache::{FetchOutcome, RequestCache, RequestKey, SharedOptions};
use crate::config::FieldConfig;
use crate::error::FetchError;
use crate::filter::apply_filter_option;
use crate::highlight::Highlighter;
use crate::option::SelectOption;
use crate::request::{OptionRequest, RequestQuery};
use crate::value_enum::{normalize, ValueEnum, ValueEnumSource};

/// Instance id of fields without a request function
pub const NO_FETCH: &str = "no-fetch";

/// Resolver status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResolverStatus {
    /// No request function; options are local
    #[default]
    Idle,
    Ready,
    Fetching,
    /// Last request for the active key failed
    Errored,
}

/// Observable state, published after every change
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolverSnapshot {
    pub keyword: Option<String>,
    pub options: Vec<SelectOption>,
    pub loading: bool,
    pub status: ResolverStatus,
    pub error: Option<FetchError>,
}

struct ResolverState {
    keyword: Option<String>,
    params: Value,
    value_enum: Option<ValueEnum>,
    /// Static options (override or enumeration-derived)
    options: Vec<SelectOption>,
    has_override: bool,
    active_key: Option<RequestKey>,
    /// Remote data for the active key
    data: SharedOptions,
    loading: bool,
    error: Option<FetchError>,
    /// Keys this instance holds a cache lease on
    leased: FxHashSet<RequestKey>,
    /// Sequence of the revalidation whose outcome may still be shown
    revision: u64,
}

struct Shared {
    config: Arc<FieldConfig>,
    request: Option<Arc<dyn OptionRequest>>,
    cache: RequestCache,
    instance_id: String,
    state: Mutex<ResolverState>,
    snapshot_tx: watch::Sender<ResolverSnapshot>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key_for(&self, state: &ResolverState) -> RequestKey {
        RequestKey::new(
            self.instance_id.as_str(),
            state.params.clone(),
            state.keyword.clone(),
        )
    }

    fn status(&self, state: &ResolverState) -> ResolverStatus {
        if self.request.is_none() {
            ResolverStatus::Idle
        } else if state.loading {
            ResolverStatus::Fetching
        } else if state.error.is_some() {
            ResolverStatus::Errored
        } else {
            ResolverStatus::Ready
        }
    }

    fn options(&self, state: &ResolverState) -> Vec<SelectOption> {
        if self.request.is_some() {
            return state.data.as_ref().clone();
        }
        apply_filter_option(
            &state.options,
            state.keyword.as_deref(),
            self.config.field_props.filter_option,
        )
    }

    fn snapshot(&self, state: &ResolverState) -> ResolverSnapshot {
        ResolverSnapshot {
            keyword: state.keyword.clone(),
            options: self.options(state),
            loading: state.loading,
            status: self.status(state),
            error: state.error.clone(),
        }
    }

    fn publish(&self, state: &ResolverState) {
        self.snapshot_tx.send_replace(self.snapshot(state));
    }

    fn track(&self, handle: AbortHandle) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Make `key` the active key, serving cached data and revalidating per policy
    fn apply_key(self: &Arc<Self>, key: RequestKey) {
        let revalidate = {
            let mut state = self.lock_state();
            if state.active_key.as_ref() == Some(&key) {
                tracing::trace!(keyword = ?key.keyword, "request key unchanged");
                return;
            }
            tracing::debug!(
                instance = %self.instance_id,
                keyword = ?key.keyword,
                "request key changed"
            );

            if state.leased.insert(key.clone()) {
                self.cache.acquire(&key);
            }
            let cached = self.cache.get(&key);
            let hit = cached.is_some();
            state.data = cached.unwrap_or_default();
            state.error = None;
            state.active_key = Some(key.clone());

            let revalidate = !hit || !self.config.cache_for_swr;
            if !revalidate {
                state.loading = false;
                self.publish(&state);
            }
            revalidate
        };

        if revalidate {
            self.revalidate(key);
        }
    }

    fn revalidate(self: &Arc<Self>, key: RequestKey) {
        let Some(request) = self.request.clone() else {
            return;
        };
        let revision = {
            let mut state = self.lock_state();
            state.revision += 1;
            state.loading = true;
            self.publish(&state);
            state.revision
        };

        let config = self.config.clone();
        let query = RequestQuery {
            params: key.params.clone(),
            keyword: key.keyword.clone(),
        };
        let in_flight = self
            .cache
            .fetch(&key, move || request.request(query, &config));

        let weak = Arc::downgrade(self);
        let waiter = tokio::spawn(async move {
            let outcome = in_flight.wait().await;
            if let Some(shared) = weak.upgrade() {
                shared.settle(&key, revision, outcome);
            }
        });
        self.track(waiter.abort_handle());
    }

    fn settle(&self, key: &RequestKey, revision: u64, outcome: FetchOutcome) {
        let mut state = self.lock_state();
        if state.revision != revision || state.active_key.as_ref() != Some(key) {
            tracing::trace!(keyword = ?key.keyword, "superseded response not displayed");
            return;
        }
        state.loading = false;
        match outcome {
            Ok(data) => {
                state.data = data;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(
                    instance = %self.instance_id,
                    keyword = ?key.keyword,
                    "option request failed: {}",
                    e
                );
                state.error = Some(e);
            }
        }
        self.publish(&state);
    }

    fn shutdown(&self) {
        let tasks = {
            let mut tracked = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *tracked)
        };
        for task in tasks {
            task.abort();
        }
        let leased = std::mem::take(&mut self.lock_state().leased);
        for key in &leased {
            self.cache.release(key);
        }
    }
}

async fn debounce_loop(
    shared: Weak<Shared>,
    mut rx: mpsc::UnboundedReceiver<RequestKey>,
    delay: Duration,
) {
    while let Some(mut latest) = rx.recv().await {
        // Restart the quiet period on every change; only the last key wins
        while let Ok(Some(next)) = tokio::time::timeout(delay, rx.recv()).await {
            tracing::trace!(keyword = ?next.keyword, "debounce restarted");
            latest = next;
        }
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.apply_key(latest);
    }
}

/// Option state of one select field
pub struct OptionResolver {
    shared: Arc<Shared>,
    debounce: Option<mpsc::UnboundedSender<RequestKey>>,
    debounce_task: Option<JoinHandle<()>>,
}

impl OptionResolver {
    /// Mount a resolver on the process-wide [`RequestCache::global`]
    ///
    /// Must be called within a tokio runtime when `request` is set.
    pub fn mount(config: FieldConfig, request: Option<Arc<dyn OptionRequest>>) -> Self {
        Self::mount_with_cache(config, request, RequestCache::global())
    }

    /// Mount a resolver on an explicit cache
    pub fn mount_with_cache(
        config: FieldConfig,
        request: Option<Arc<dyn OptionRequest>>,
        cache: RequestCache,
    ) -> Self {
        let config = Arc::new(config);
        let instance_id = match (&config.field_key, &request) {
            (Some(field_key), _) => field_key.clone(),
            (None, Some(_)) => Uuid::new_v4().to_string(),
            (None, None) => NO_FETCH.to_string(),
        };

        let (has_override, options) = match &config.field_props.options {
            Some(options) => (true, options.clone()),
            None => (
                false,
                config
                    .value_enum
                    .as_ref()
                    .map(ValueEnum::to_field_options)
                    .unwrap_or_default(),
            ),
        };

        let state = ResolverState {
            keyword: config.default_keyword.clone(),
            params: config.params.clone(),
            value_enum: config.value_enum.clone(),
            options,
            has_override,
            active_key: None,
            data: SharedOptions::default(),
            loading: false,
            error: None,
            leased: FxHashSet::default(),
            revision: 0,
        };

        let (snapshot_tx, _) = watch::channel(ResolverSnapshot::default());
        let shared = Arc::new(Shared {
            config: config.clone(),
            request,
            cache,
            instance_id,
            state: Mutex::new(state),
            snapshot_tx,
            tasks: Mutex::new(Vec::new()),
        });
        shared.publish(&shared.lock_state());

        let (debounce, debounce_task) = if shared.request.is_some() {
            let (tx, rx) = mpsc::unbounded_channel();
            let task = tokio::spawn(debounce_loop(
                Arc::downgrade(&shared),
                rx,
                config.effective_debounce(),
            ));
            let initial = shared.key_for(&shared.lock_state());
            shared.apply_key(initial);
            (Some(tx), Some(task))
        } else {
            (None, None)
        };

        tracing::debug!(instance = %shared.instance_id, "option resolver mounted");
        Self {
            shared,
            debounce,
            debounce_task,
        }
    }

    fn schedule(&self, key: RequestKey) {
        if let Some(tx) = &self.debounce {
            tracing::trace!(keyword = ?key.keyword, "key change queued");
            // Only fails once the debounce task is gone, i.e. during drop
            let _ = tx.send(key);
        }
    }

    /// Set the search keyword
    ///
    /// With a request function the request key follows after the debounce;
    /// without one the static options are filtered locally right away.
    pub fn fetch_data(&self, keyword: Option<&str>) {
        let key = {
            let mut state = self.shared.lock_state();
            state.keyword = keyword.map(str::to_string);
            self.shared.publish(&state);
            self.shared.key_for(&state)
        };
        self.schedule(key);
    }

    /// Replace the request parameters; equal parameters are a no-op
    pub fn set_params(&self, params: Value) {
        let key = {
            let mut state = self.shared.lock_state();
            if state.params == params {
                return;
            }
            state.params = params;
            self.shared.key_for(&state)
        };
        self.schedule(key);
    }

    /// Replace the enumeration
    ///
    /// Static options are reseeded on a structural change unless the field
    /// has an explicit option list.
    pub fn set_value_enum(&self, source: impl Into<ValueEnumSource>) {
        let value_enum = normalize(source);
        let mut state = self.shared.lock_state();
        if state.value_enum.as_ref() == Some(&value_enum) {
            return;
        }
        if !state.has_override {
            state.options = value_enum.to_field_options();
        }
        state.value_enum = Some(value_enum);
        self.shared.publish(&state);
    }

    /// Clear the keyword and displayed data, forgetting the active key
    ///
    /// The cache entry of the active key is deleted, so resolving the same key
    /// again issues a new request.
    pub fn reset_data(&self) {
        let key = {
            let mut state = self.shared.lock_state();
            state.keyword = None;
            state.data = SharedOptions::default();
            state.loading = false;
            state.error = None;
            // Outcomes of requests issued before the reset are never shown
            state.revision += 1;
            if let Some(active) = state.active_key.take() {
                state.leased.remove(&active);
                self.shared.cache.delete(&active);
            }
            self.shared.publish(&state);
            self.shared.key_for(&state)
        };
        tracing::debug!(instance = %self.shared.instance_id, "option data reset");
        self.schedule(key);
    }

    /// Revalidate the active key
    pub fn refresh(&self) {
        let active = self.shared.lock_state().active_key.clone();
        if let Some(key) = active {
            self.shared.revalidate(key);
        }
    }

    /// Network reconnect signal; revalidates only in stale-while-revalidate mode
    pub fn on_reconnect(&self) {
        if self.shared.config.cache_for_swr {
            tracing::debug!(instance = %self.shared.instance_id, "revalidating on reconnect");
            self.refresh();
        }
    }

    /// Window focus signal; never revalidates
    pub fn on_focus(&self) {
        tracing::trace!(instance = %self.shared.instance_id, "focus ignored");
    }

    pub fn loading(&self) -> bool {
        self.shared.lock_state().loading
    }

    /// Options to display
    ///
    /// The active key's data, unfiltered, when a request function is
    /// configured; otherwise the keyword-filtered static options.
    pub fn options(&self) -> Vec<SelectOption> {
        self.shared.options(&self.shared.lock_state())
    }

    pub fn keyword(&self) -> Option<String> {
        self.shared.lock_state().keyword.clone()
    }

    pub fn status(&self) -> ResolverStatus {
        self.shared.status(&self.shared.lock_state())
    }

    pub fn last_error(&self) -> Option<FetchError> {
        self.shared.lock_state().error.clone()
    }

    /// Current enumeration, if any
    pub fn value_enum(&self) -> Option<ValueEnum> {
        self.shared.lock_state().value_enum.clone()
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        self.shared.snapshot(&self.shared.lock_state())
    }

    /// Receiver of state snapshots
    pub fn subscribe(&self) -> watch::Receiver<ResolverSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Highlighter for the current keyword
    pub fn highlighter(&self) -> Highlighter {
        let keyword = self.keyword();
        Highlighter::new(keyword.as_slice())
    }

    pub fn instance_id(&self) -> &str {
        &self.shared.instance_id
    }

    pub fn config(&self) -> &FieldConfig {
        &self.shared.config
    }
}

impl Drop for OptionResolver {
    fn drop(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
        self.debounce = None;
        self.shared.shutdown();
        tracing::debug!(instance = %self.shared.instance_id, "option resolver unmounted");
    }
}
