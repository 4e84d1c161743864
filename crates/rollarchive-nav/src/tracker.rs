//! Sticky-chrome detection

use rollarchive_core::StickyEdge;

use crate::viewport::ScrollMetrics;

/// Tracks whether a reference element has crossed a viewport edge
///
/// The element position is captured once; build a new tracker after the
/// layout above it changes.
#[derive(Debug, Clone)]
pub struct ScrollPositionTracker {
    element_top: i64,
    edge: StickyEdge,
    sticky: bool,
}

impl ScrollPositionTracker {
    pub fn new(element_top: i64, edge: StickyEdge) -> Self {
        Self {
            element_top,
            edge,
            sticky: false,
        }
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn edge(&self) -> StickyEdge {
        self.edge
    }

    /// Recompute on scroll or resize; returns the new flag only when it toggles
    pub fn update(&mut self, metrics: &ScrollMetrics, chrome_visible: bool) -> Option<bool> {
        let sticky = match self.edge {
            StickyEdge::Top => metrics.scroll_top >= self.element_top,
            StickyEdge::Bottom => {
                metrics.scroll_top + metrics.viewport_height >= self.element_top && chrome_visible
            }
        };
        if sticky == self.sticky {
            return None;
        }
        self.sticky = sticky;
        Some(sticky)
    }
}
