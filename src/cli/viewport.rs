//! Headless list surface
//!
//! Stands in for a list display when paging from the command line: it
//! holds a row count and a scroll position, and learns about new items
//! through list binding notifications.

use crate::binding::ListSink;
use crate::trigger::{LayoutKind, ListSurface};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Linear viewport showing `rows` items at a time
#[derive(Debug)]
pub struct Viewport {
    rows: usize,
    count: AtomicUsize,
    top: AtomicUsize,
}

impl Viewport {
    /// Create an empty viewport; `rows` is clamped to at least 1
    pub fn new(rows: usize) -> Self {
        Self {
            rows: rows.max(1),
            count: AtomicUsize::new(0),
            top: AtomicUsize::new(0),
        }
    }

    /// Scroll so the last item is visible; returns the scroll delta in rows
    pub fn scroll_to_end(&self) -> i32 {
        let count = self.count.load(Ordering::SeqCst);
        let new_top = count.saturating_sub(self.rows);
        let old_top = self.top.swap(new_top, Ordering::SeqCst);
        i32::try_from(new_top).unwrap_or(i32::MAX) - i32::try_from(old_top).unwrap_or(i32::MAX)
    }

    pub fn top(&self) -> usize {
        self.top.load(Ordering::SeqCst)
    }
}

impl ListSurface for Viewport {
    fn layout_kind(&self) -> LayoutKind {
        LayoutKind::Linear
    }

    fn item_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn last_visible_index(&self) -> Option<usize> {
        let count = self.item_count();
        if count == 0 {
            return None;
        }
        Some((self.top() + self.rows).min(count) - 1)
    }
}

impl ListSink for Viewport {
    fn notify_full_replace(&self, count: usize) {
        self.count.store(count, Ordering::SeqCst);
        self.top.store(0, Ordering::SeqCst);
    }

    fn notify_range_appended(&self, start: usize, count: usize) {
        self.count.store(start + count, Ordering::SeqCst);
    }
}
