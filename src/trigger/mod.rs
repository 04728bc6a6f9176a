//! Scroll trigger module
//!
//! Watches a list surface's viewport and asks the loader for the next page
//! when the user scrolls forward close to the end of the loaded items.

mod types;

pub use types::{LayoutKind, ListSurface, TriggerOptions, TriggerOutcome, DEFAULT_THRESHOLD};

use crate::error::{Error, Result};
use crate::loader::PageLoader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Bridges viewport scroll events to [`PageLoader::load_next`]
pub struct ScrollTrigger<T> {
    loader: PageLoader<T>,
    surface: Arc<dyn ListSurface>,
    options: TriggerOptions,
    attached: AtomicBool,
}

impl<T> ScrollTrigger<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a detached trigger
    ///
    /// Fails when the surface's layout is not linear or grid, or when the
    /// threshold is zero.
    pub fn new(
        surface: Arc<dyn ListSurface>,
        loader: PageLoader<T>,
        options: TriggerOptions,
    ) -> Result<Self> {
        let layout = surface.layout_kind();
        if !layout.is_supported() {
            return Err(Error::unsupported_layout(layout.to_string()));
        }
        if options.threshold == 0 {
            return Err(Error::invalid_value("threshold", "must be positive"));
        }

        Ok(Self {
            loader,
            surface,
            options,
            attached: AtomicBool::new(false),
        })
    }

    /// Create a trigger and attach it right away
    pub fn attached(
        surface: Arc<dyn ListSurface>,
        loader: PageLoader<T>,
        options: TriggerOptions,
    ) -> Result<Self> {
        let trigger = Self::new(surface, loader, options)?;
        trigger.attach();
        Ok(trigger)
    }

    /// Start observing scroll events; starts the loader if it auto-starts.
    /// Returns false if already attached.
    pub fn attach(&self) -> bool {
        if self.attached.swap(true, Ordering::SeqCst) {
            return false;
        }
        if self.loader.options().auto_start {
            self.loader.start();
        }
        debug!("scroll trigger attached");
        true
    }

    /// Stop observing scroll events and cancel in-flight work.
    /// Returns false if already detached.
    pub fn detach(&self) -> bool {
        if !self.attached.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.loader.cancel();
        debug!("scroll trigger detached");
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Invalidate the loader and reload from the first page
    pub fn invalidate(&self) {
        self.loader.invalidate(true);
    }

    /// Handle a scroll delta from the surface
    pub fn on_scrolled(&self, _dx: i32, dy: i32) -> TriggerOutcome {
        if !self.is_attached() {
            return TriggerOutcome::Detached;
        }
        if dy <= 0 {
            return TriggerOutcome::NotForward;
        }
        if self.loader.phase().is_busy() {
            return TriggerOutcome::Busy;
        }
        // the end notice fires on any forward scroll, near the end or not
        if self.loader.is_end_reached() && !self.loader.is_end_notice_shown() {
            return TriggerOutcome::Requested(self.loader.load_next());
        }

        let remaining = self.remaining();
        if remaining >= self.options.threshold {
            return TriggerOutcome::NotNearEnd { remaining };
        }

        let outcome = self.loader.load_next();
        debug!(remaining, ?outcome, "scroll near end");
        TriggerOutcome::Requested(outcome)
    }

    /// Items below the last visible one
    pub fn remaining(&self) -> usize {
        let count = self.surface.item_count();
        match self.surface.last_visible_index() {
            Some(last) => count.saturating_sub(last + 1),
            None => count,
        }
    }

    pub fn loader(&self) -> &PageLoader<T> {
        &self.loader
    }

    pub fn options(&self) -> &TriggerOptions {
        &self.options
    }
}
