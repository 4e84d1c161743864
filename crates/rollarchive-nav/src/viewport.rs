//! Geometry the host reports to the navigation core, in rows

/// Scroll position of the archive view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: i64,
    pub viewport_height: i64,
    pub document_height: i64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: i64, viewport_height: i64, document_height: i64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Whether the viewport already shows the end of the document
    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height
    }

    /// Largest meaningful scroll position
    pub fn max_scroll(&self) -> i64 {
        (self.document_height - self.viewport_height).max(0)
    }
}

/// Position of one rendered archive item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBox {
    pub top: i64,
    pub height: i64,
    /// Target of the item's title link
    pub link: Option<String>,
}
