//! Loader types
//!
//! Options and observer hooks for [`super::PageLoader`].

use crate::pagination::Cursor;
use crate::types::LoadingPhase;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Options fixed at loader construction
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Start the first load cycle on construction and on attach
    pub auto_start: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

impl LoaderOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set auto start
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }
}

/// One published state of the data slot
///
/// `epoch` changes whenever the loader is invalidated, so a consumer that
/// only sees the latest snapshot can still tell the data was replaced.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub epoch: u64,
    /// Accumulated items; `None` right after a reset
    pub items: Option<Arc<Vec<T>>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            epoch: self.epoch,
            items: self.items.clone(),
        }
    }
}

impl<T> Snapshot<T> {
    pub(super) fn reset(epoch: u64) -> Self {
        Self { epoch, items: None }
    }

    /// Number of items, zero after a reset
    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Notified by `invalidate()` before any state is cleared
pub trait InvalidateObserver: Send + Sync {
    /// Called once per invalidate, before data disappears
    fn on_invalidate(&self);
}

impl<F> InvalidateObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_invalidate(&self) {
        self();
    }
}

/// Mutable loader state, guarded by the loader's mutex
pub(super) struct LoaderState<T> {
    /// Accumulated items since the last invalidate
    pub data: Arc<Vec<T>>,
    pub phase: LoadingPhase,
    pub end_reached: bool,
    pub end_notice_shown: bool,
    /// `start()` (or an implicit first load) has run since the last reset
    pub started: bool,
    /// The initial page has been fetched successfully
    pub initial_loaded: bool,
    pub cursor: Cursor,
    /// Bumped on invalidate and cancel; results from older epochs are dropped
    pub epoch: u64,
    /// Cancelled together with the epoch it belongs to
    pub cancel: CancellationToken,
    pub last_error: Option<String>,
}

impl<T> LoaderState<T> {
    pub(super) fn new(cursor: Cursor) -> Self {
        Self {
            data: Arc::new(Vec::new()),
            phase: LoadingPhase::Idle,
            end_reached: false,
            end_notice_shown: false,
            started: false,
            initial_loaded: false,
            cursor,
            epoch: 0,
            cancel: CancellationToken::new(),
            last_error: None,
        }
    }

    /// Cancel in-flight work and move to a fresh epoch
    pub(super) fn next_epoch(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.epoch += 1;
    }
}
