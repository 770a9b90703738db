//! Fetch coordinator: turns triggers into source calls and owns [`FetchState`].
//!
//! Each trigger starts a new cycle and bumps a generation counter. A cycle may
//! write shared state only while its generation is still current, and the
//! bump and the check both run under the state channel's lock, so a
//! superseded cycle can never overwrite a newer one regardless of the order
//! in which responses arrive. Superseded cycles are also aborted.
//!
//! Failure policy: a transport error sets `error` and clears `loading` but
//! keeps the last successfully fetched `data`. Nothing is retried
//! automatically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lugar_core::{CategoryStyles, Coordinates, DisplayBusinessEntity};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::adapter::{to_display_entities, AdapterContext};
use crate::debounce::Debouncer;
use crate::error::DiscoveryError;
use crate::source::{BusinessSource, CycleToken, SourceQuery};

/// Snapshot of the fetch pipeline as seen by presentation code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    pub loading: bool,
    /// Human-readable message of the latest failed cycle.
    pub error: Option<String>,
    pub data: Vec<DisplayBusinessEntity>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Incremented on every successful data write.
    pub revision: u64,
}

/// Shared between the controller and its spawned cycles.
struct Inner {
    generation: Arc<AtomicU64>,
    state: watch::Sender<FetchState>,
}

impl Inner {
    /// Starts a new generation and raises `loading`. Returns the new generation.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        generation
    }

    /// Retires the current generation without starting a new one.
    fn retire(&self) {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            std::mem::replace(&mut state.loading, false)
        });
    }

    /// Writes the outcome of cycle `generation`. Returns `false` and leaves
    /// state untouched when the cycle has been superseded.
    fn commit(
        &self,
        generation: u64,
        outcome: Result<Vec<DisplayBusinessEntity>, DiscoveryError>,
    ) -> bool {
        self.state.send_if_modified(|state| {
            let current = self.generation.load(Ordering::SeqCst);
            if current != generation {
                tracing::debug!(generation, current, "discarding superseded fetch result");
                return false;
            }
            state.loading = false;
            match outcome {
                Ok(data) => {
                    tracing::debug!(generation, count = data.len(), "fetch cycle succeeded");
                    state.data = data;
                    state.error = None;
                    state.last_updated = Some(Utc::now());
                    state.revision += 1;
                }
                Err(e) => {
                    tracing::warn!(generation, error = %e, "fetch cycle failed");
                    state.error = Some(e.user_message());
                }
            }
            true
        })
    }
}

/// Mediates between filter changes and the business data source.
pub struct FetchController {
    source: Arc<dyn BusinessSource>,
    styles: Arc<CategoryStyles>,
    origin: Mutex<Option<Coordinates>>,
    inner: Arc<Inner>,
    debouncer: Mutex<Debouncer>,
    last_query: Mutex<SourceQuery>,
}

impl FetchController {
    /// Creates an idle controller. A zero `debounce` disables debouncing.
    #[must_use]
    pub fn new(
        source: Arc<dyn BusinessSource>,
        styles: Arc<CategoryStyles>,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            source,
            styles,
            origin: Mutex::new(None),
            inner: Arc::new(Inner {
                generation: Arc::new(AtomicU64::new(0)),
                state,
            }),
            debouncer: Mutex::new(Debouncer::new(debounce)),
            last_query: Mutex::new(SourceQuery::default()),
        }
    }

    /// Sets the position distances are measured from. Applies to cycles
    /// started after the call.
    pub fn set_origin(&self, origin: Option<Coordinates>) {
        *self.origin.lock() = origin;
    }

    #[must_use]
    pub fn origin(&self) -> Option<Coordinates> {
        *self.origin.lock()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every observable state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn last_query(&self) -> SourceQuery {
        self.last_query.lock().clone()
    }

    /// Starts a new fetch cycle for `query`, cancelling any outstanding one.
    ///
    /// `loading` is raised before returning. With a debounce configured the
    /// source call happens once triggers have been quiet for the delay.
    pub fn trigger(&self, query: SourceQuery) {
        self.start_cycle(query, false);
    }

    /// Like [`FetchController::trigger`] but skips the debounce delay.
    pub fn trigger_now(&self, query: SourceQuery) {
        self.start_cycle(query, true);
    }

    /// Re-runs the last query immediately, superseding any outstanding cycle.
    pub fn refetch(&self) {
        let query = self.last_query();
        self.start_cycle(query, true);
    }

    /// Cancels the outstanding cycle, if any, and clears `loading`. Data and
    /// error are left as they were.
    pub fn cancel(&self) {
        let mut debouncer = self.debouncer.lock();
        debouncer.cancel();
        self.inner.retire();
    }

    /// Waits until no cycle is loading and returns the state at that point.
    pub async fn settled(&self) -> FetchState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.loading)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    fn start_cycle(&self, query: SourceQuery, immediate: bool) {
        // The debouncer lock orders concurrent triggers: the cycle scheduled
        // last is always the one holding the newest generation.
        let mut debouncer = self.debouncer.lock();
        *self.last_query.lock() = query.clone();

        let generation = self.inner.begin();
        let token = CycleToken::new(generation, Arc::clone(&self.inner.generation));
        let cycle = run_cycle(
            Arc::clone(&self.inner),
            Arc::clone(&self.source),
            Arc::clone(&self.styles),
            self.origin(),
            query,
            token,
        );

        if debouncer.cancel() {
            tracing::debug!(generation, "superseded outstanding fetch cycle");
        }
        if immediate {
            debouncer.schedule_now(cycle);
        } else {
            debouncer.schedule(cycle);
        }
    }
}

async fn run_cycle(
    inner: Arc<Inner>,
    source: Arc<dyn BusinessSource>,
    styles: Arc<CategoryStyles>,
    origin: Option<Coordinates>,
    query: SourceQuery,
    token: CycleToken,
) {
    let generation = token.generation();
    tracing::debug!(generation, ?query, "fetching businesses");
    let outcome = source
        .fetch(&query, &token)
        .await
        .map(|raws| to_display_entities(&raws, &AdapterContext::new(&styles, origin)));
    inner.commit(generation, outcome);
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
