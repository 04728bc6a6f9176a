//! List binding module
//!
//! Turns each published data snapshot into the smallest change
//! notification a list display can act on.


use crate::loader::{PageLoader, Snapshot};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Change notifications accepted by a list display
pub trait ListSink: Send + Sync {
    /// Everything changed; redraw the `count` current items from scratch
    fn notify_full_replace(&self, count: usize);

    /// `count` items were appended starting at `start`
    fn notify_range_appended(&self, start: usize, count: usize);
}

/// Notification issued for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Data was reset, empty, or shrank
    FullReplace,
    /// Items `[start, start + count)` are new
    RangeAppended {
        /// First new index
        start: usize,
        /// Number of new items
        count: usize,
    },
    /// Same length as before; nothing was sent
    Unchanged,
}

/// Holds the latest snapshot shown by a list display
pub struct ListBinding<T> {
    sink: Arc<dyn ListSink>,
    items: Option<Arc<Vec<T>>>,
    epoch: Option<u64>,
}

impl<T> ListBinding<T> {
    /// Create a binding with no data
    pub fn new(sink: Arc<dyn ListSink>) -> Self {
        Self {
            sink,
            items: None,
            epoch: None,
        }
    }

    /// Take a loader snapshot and notify the sink
    ///
    /// A snapshot from a different epoch than the last one applied is a
    /// full replace whatever its length, since the loader was reset in
    /// between.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot<T>) -> ListChange {
        let reset = self.epoch.is_some_and(|epoch| epoch != snapshot.epoch);
        self.epoch = Some(snapshot.epoch);
        self.update(snapshot.items, reset)
    }

    /// Take a new item list and notify the sink, judging by length alone
    pub fn apply(&mut self, data: Option<Arc<Vec<T>>>) -> ListChange {
        self.update(data, false)
    }

    fn update(&mut self, data: Option<Arc<Vec<T>>>, reset: bool) -> ListChange {
        let previous = self.item_count();
        let current = data.as_ref().map_or(0, |items| items.len());
        self.items = data;

        let change = if reset || current == 0 || current < previous {
            ListChange::FullReplace
        } else if current == previous {
            ListChange::Unchanged
        } else {
            ListChange::RangeAppended {
                start: previous,
                count: current - previous,
            }
        };

        match change {
            ListChange::FullReplace => self.sink.notify_full_replace(current),
            ListChange::RangeAppended { start, count } => {
                self.sink.notify_range_appended(start, count);
            }
            ListChange::Unchanged => {}
        }
        change
    }

    /// Number of items in the current snapshot
    pub fn item_count(&self) -> usize {
        self.items.as_ref().map_or(0, |items| items.len())
    }

    /// Item at `index` in the current snapshot
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.as_ref().and_then(|items| items.get(index))
    }

    /// The current snapshot
    pub fn items(&self) -> Option<&Arc<Vec<T>>> {
        self.items.as_ref()
    }
}

/// Forward every data snapshot the loader publishes into `sink`
///
/// The task ends once every handle to the loader is dropped; abort the
/// returned handle to stop earlier.
pub fn bind<T>(loader: &PageLoader<T>, sink: Arc<dyn ListSink>) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    let mut rx = loader.subscribe_data();
    let mut binding = ListBinding::new(sink);

    tokio::spawn(async move {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            let change = binding.apply_snapshot(snapshot);
            debug!(?change, items = binding.item_count(), "list binding updated");
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
