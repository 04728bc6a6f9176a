//! Trigger types and traits
//!
//! The display surface boundary consumed by [`super::ScrollTrigger`].

use crate::types::LoadOutcome;
use std::fmt;

/// Default number of unseen trailing items that triggers the next page
pub const DEFAULT_THRESHOLD: usize = 10;

/// Layout strategy of a list surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutKind {
    /// Single column or row
    Linear,
    /// Fixed number of cells per row
    Grid {
        /// Cells per row
        span: usize,
    },
    /// Staggered grid with variable cell sizes
    Staggered,
    /// Any other layout, by name
    Custom(String),
}

impl LayoutKind {
    /// Whether a "last visible index" is meaningful for this layout
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Linear => true,
            Self::Grid { span } => *span > 0,
            Self::Staggered | Self::Custom(_) => false,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Grid { span } => write!(f, "grid(span={span})"),
            Self::Staggered => f.write_str("staggered"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Viewport introspection offered by a list-rendering surface
pub trait ListSurface: Send + Sync {
    /// Layout in use; checked once when the trigger is created
    fn layout_kind(&self) -> LayoutKind;

    /// Number of items the surface currently holds
    fn item_count(&self) -> usize;

    /// Index of the last visible item, `None` when nothing is visible
    fn last_visible_index(&self) -> Option<usize>;
}

/// Options for a scroll trigger
#[derive(Debug, Clone)]
pub struct TriggerOptions {
    /// Load when fewer than this many items remain below the viewport
    pub threshold: usize,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TriggerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }
}

/// What a scroll event led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The trigger is detached
    Detached,
    /// Scroll was not forward
    NotForward,
    /// A load cycle is already in flight
    Busy,
    /// Enough items remain below the viewport
    NotNearEnd {
        /// Unseen trailing items
        remaining: usize,
    },
    /// The loader was asked for the next page
    Requested(LoadOutcome),
}

impl TriggerOutcome {
    /// Whether this event caused a fetch
    pub fn fetched(self) -> bool {
        matches!(self, Self::Requested(LoadOutcome::Started))
    }
}
