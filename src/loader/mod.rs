//! Page loader module
//!
//! The pagination controller: accumulates pages from a [`PageStrategy`],
//! tracks the loading phase and end of data, and publishes both through
//! watch slots.
//!
//! # Overview
//!
//! - `start()` runs the first load cycle once
//! - `load_next()` runs a cycle unless one is in flight or data is exhausted
//! - `invalidate()` clears everything and optionally reloads
//! - `cancel()` drops in-flight work but keeps accumulated data
//!
//! Each cycle is a tokio task tagged with the epoch it started in. Every
//! invalidate or cancel moves to a new epoch and cancels the old token, and
//! a finishing cycle only touches state when its epoch is still current.

mod types;

pub use types::{InvalidateObserver, LoaderOptions, Snapshot};

use self::types::LoaderState;
use crate::error::{Error, Result};
use crate::pagination::{Cursor, FetchMode, Fetched, PageStrategy, StrategyKind};
use crate::types::{LoadOutcome, LoadingPhase};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Latest accumulated data, tagged with the epoch it belongs to
pub type DataSlot<T> = watch::Receiver<Snapshot<T>>;

/// Latest loading phase
pub type PhaseSlot = watch::Receiver<LoadingPhase>;

struct Inner<T> {
    strategy: PageStrategy<T>,
    options: LoaderOptions,
    runtime: Handle,
    state: Mutex<LoaderState<T>>,
    data_tx: watch::Sender<Snapshot<T>>,
    phase_tx: watch::Sender<LoadingPhase>,
    observer: Mutex<Option<Arc<dyn InvalidateObserver>>>,
}

/// Incremental pagination controller
///
/// Cheap to clone; all clones drive the same loader.
pub struct PageLoader<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PageLoader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for PageLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLoader")
            .field("strategy", &self.inner.strategy)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl<T> PageLoader<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a loader on the current tokio runtime
    ///
    /// Fails with a configuration error when called outside a runtime.
    pub fn new(strategy: PageStrategy<T>, options: LoaderOptions) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::config(format!(
                "PageLoader needs a tokio runtime ({e}); use PageLoader::with_runtime"
            ))
        })?;
        Ok(Self::with_runtime(strategy, options, runtime))
    }

    /// Create a loader that spawns its load cycles on `runtime`
    pub fn with_runtime(strategy: PageStrategy<T>, options: LoaderOptions, runtime: Handle) -> Self {
        let state = LoaderState::new(strategy.initial_cursor());
        let (data_tx, _) = watch::channel(Snapshot::reset(0));
        let (phase_tx, _) = watch::channel(LoadingPhase::Idle);

        let loader = Self {
            inner: Arc::new(Inner {
                strategy,
                options,
                runtime,
                state: Mutex::new(state),
                data_tx,
                phase_tx,
                observer: Mutex::new(None),
            }),
        };

        if loader.inner.options.auto_start {
            loader.start();
        }
        loader
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Run the first load cycle unless the loader has already started
    pub fn start(&self) -> LoadOutcome {
        let mut state = self.inner.lock();
        if state.started {
            return LoadOutcome::AlreadyStarted;
        }
        state.started = true;
        self.inner.begin_cycle(&mut state)
    }

    /// Load the next page
    ///
    /// No-op while a cycle is in flight. Once the end of data is reached the
    /// first call flips the notice flag and later calls do nothing; neither
    /// fetches. Before the initial page has loaded this fetches it instead.
    pub fn load_next(&self) -> LoadOutcome {
        let mut state = self.inner.lock();
        if state.phase.is_busy() {
            return LoadOutcome::AlreadyLoading;
        }
        if state.end_reached {
            if state.end_notice_shown {
                return LoadOutcome::Exhausted;
            }
            state.end_notice_shown = true;
            debug!("end of data reached, notice flagged");
            return LoadOutcome::EndNotice;
        }
        state.started = true;
        self.inner.begin_cycle(&mut state)
    }

    /// Drop all data and reset the cursor; reload right away if `reload`
    pub fn invalidate(&self, reload: bool) {
        let observer = self.inner.observer().clone();
        if let Some(observer) = observer {
            observer.on_invalidate();
        }

        let mut state = self.inner.lock();
        state.next_epoch();
        state.data = Arc::new(Vec::new());
        state.end_reached = false;
        state.end_notice_shown = false;
        state.started = false;
        state.initial_loaded = false;
        state.cursor = self.inner.strategy.reset_cursor();
        state.last_error = None;
        state.phase = LoadingPhase::Idle;
        self.inner.data_tx.send_replace(Snapshot::reset(state.epoch));
        self.inner.phase_tx.send_replace(LoadingPhase::Idle);
        info!(epoch = state.epoch, reload, "loader invalidated");

        if reload {
            state.started = true;
            self.inner.begin_cycle(&mut state);
        }
    }

    /// Cancel the in-flight cycle, if any, keeping accumulated data
    ///
    /// The phase settles to Idle. If the initial page never arrived the
    /// loader counts as not started, so a later `start()` runs again.
    pub fn cancel(&self) {
        let mut state = self.inner.lock();
        if !state.phase.is_busy() {
            return;
        }
        state.next_epoch();
        state.phase = LoadingPhase::Idle;
        if !state.initial_loaded {
            state.started = false;
        }
        self.inner.phase_tx.send_replace(LoadingPhase::Idle);
        debug!(epoch = state.epoch, "load cycle cancelled");
    }

    /// Assign the continuation key used by the next fetch
    ///
    /// Only valid for key strategies. An empty key clears it.
    pub fn set_key(&self, key: Option<String>) -> Result<()> {
        if self.inner.strategy.kind() != StrategyKind::Key {
            return Err(Error::config(format!(
                "set_key is not supported by the {} strategy",
                self.inner.strategy.kind()
            )));
        }
        let mut state = self.inner.lock();
        state.cursor = Cursor::Key(key.filter(|k| !k.is_empty()));
        Ok(())
    }

    /// Register the observer notified before each invalidate
    pub fn set_invalidate_observer(&self, observer: impl InvalidateObserver + 'static) {
        *self.inner.observer() = Some(Arc::new(observer));
    }

    /// Remove the invalidate observer
    pub fn clear_invalidate_observer(&self) {
        *self.inner.observer() = None;
    }

    /// Wait until no cycle is in flight and return the settled phase
    pub async fn settled(&self) -> LoadingPhase {
        let mut rx = self.inner.phase_tx.subscribe();
        let settled = match rx.wait_for(|phase| !phase.is_busy()).await {
            Ok(phase) => *phase,
            Err(_) => self.phase(),
        };
        settled
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Latest published data snapshot
    pub fn snapshot(&self) -> Snapshot<T> {
        self.inner.data_tx.borrow().clone()
    }

    /// Subscribe to the accumulated data slot
    pub fn subscribe_data(&self) -> DataSlot<T> {
        self.inner.data_tx.subscribe()
    }

    /// Subscribe to the loading phase slot
    pub fn subscribe_phase(&self) -> PhaseSlot {
        self.inner.phase_tx.subscribe()
    }

    /// Snapshot of the accumulated items
    pub fn data(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.inner.lock().data)
    }

    /// Number of accumulated items
    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    /// True when nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current loading phase
    pub fn phase(&self) -> LoadingPhase {
        self.inner.lock().phase
    }

    /// True once a short or absent page has arrived
    pub fn is_end_reached(&self) -> bool {
        self.inner.lock().end_reached
    }

    /// True once `load_next` has reported the end of data
    pub fn is_end_notice_shown(&self) -> bool {
        self.inner.lock().end_notice_shown
    }

    /// True after `start` (or an implicit first load) since the last reset
    pub fn is_started(&self) -> bool {
        self.inner.lock().started
    }

    /// Cursor the next fetch will use
    pub fn cursor(&self) -> Cursor {
        self.inner.lock().cursor.clone()
    }

    /// Current continuation key, for key strategies
    pub fn key(&self) -> Option<String> {
        match &self.inner.lock().cursor {
            Cursor::Key(key) => key.clone(),
            _ => None,
        }
    }

    /// Message of the last failed fetch, cleared by the next success
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Current epoch
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Items per full page
    pub fn page_limit(&self) -> u32 {
        self.inner.strategy.page_limit()
    }

    /// Addressing strategy in use
    pub fn strategy_kind(&self) -> StrategyKind {
        self.inner.strategy.kind()
    }

    /// Options the loader was built with
    pub fn options(&self) -> &LoaderOptions {
        &self.inner.options
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, LoaderState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observer(&self) -> MutexGuard<'_, Option<Arc<dyn InvalidateObserver>>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, state: &mut LoaderState<T>, phase: LoadingPhase) {
        state.phase = phase;
        self.phase_tx.send_replace(phase);
    }

    /// Move to Loading and spawn the fetch. Caller holds the state lock.
    fn begin_cycle(self: &Arc<Self>, state: &mut LoaderState<T>) -> LoadOutcome {
        let mode = if state.initial_loaded {
            FetchMode::Next
        } else {
            FetchMode::Initial
        };
        let epoch = state.epoch;
        let token = state.cancel.clone();
        let cursor = state.cursor.clone();

        self.set_phase(state, LoadingPhase::Starting);
        self.set_phase(state, LoadingPhase::Loading);
        debug!(epoch, %cursor, ?mode, "load cycle started");

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.run_cycle(epoch, token, cursor, mode).await;
        });
        LoadOutcome::Started
    }

    async fn run_cycle(&self, epoch: u64, token: CancellationToken, cursor: Cursor, mode: FetchMode) {
        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::Cancelled),
            result = self.strategy.fetch(&cursor, mode) => result,
        };
        self.finish(epoch, &cursor, result);
    }

    /// Apply a finished fetch if it still belongs to the current epoch
    fn finish(&self, epoch: u64, started_at: &Cursor, result: Result<Fetched<T>>) {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!(
                epoch,
                current = state.epoch,
                "discarding result from stale load cycle"
            );
            return;
        }

        match result {
            Ok(fetched) => {
                let page_len = fetched.items.len();
                if fetched.reaches_end(self.strategy.page_limit()) {
                    state.end_reached = true;
                }
                // a key assigned mid-flight wins over the fetch's own cursor
                if state.cursor == *started_at {
                    state.cursor = fetched.next;
                }
                Arc::make_mut(&mut state.data).extend(fetched.items);
                state.initial_loaded = true;
                state.last_error = None;

                debug!(
                    epoch,
                    page_len,
                    total = state.data.len(),
                    end_reached = state.end_reached,
                    "load cycle finished"
                );
                self.data_tx.send_replace(Snapshot {
                    epoch,
                    items: Some(Arc::clone(&state.data)),
                });
                self.set_phase(&mut state, LoadingPhase::Success);
            }
            Err(e) if e.is_cancellation() => {
                debug!(epoch, "load cycle cancelled by source");
                if !state.initial_loaded {
                    state.started = false;
                }
                self.set_phase(&mut state, LoadingPhase::Idle);
            }
            Err(e) => {
                warn!(epoch, cursor = %started_at, error = %e, "page fetch failed");
                state.last_error = Some(e.to_string());
                self.set_phase(&mut state, LoadingPhase::Error);
            }
        }
    }
}
