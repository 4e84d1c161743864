//! Keyboard cursor over the rendered archive items

use tracing::debug;

use crate::viewport::{ItemBox, ScrollMetrics};
use crate::Direction;

/// Result of moving the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An item on this page was selected; scroll so its top sits at `scroll_to`
    Selected { index: usize, scroll_to: i64 },
    /// The cursor ran off the page; it stays put until the page actually changes
    Overflow(Direction),
}

#[derive(Debug, Clone)]
pub struct SelectionNavigator {
    cursor: Option<usize>,
    /// Rows kept above the selected item
    offset: i64,
    tolerance: i64,
    /// Scroll target watched for manual scrolling away
    detector: Option<i64>,
}

impl SelectionNavigator {
    pub fn new(offset: i64, tolerance: i64) -> Self {
        Self {
            cursor: None,
            offset,
            tolerance,
            detector: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_detecting(&self) -> bool {
        self.detector.is_some()
    }

    pub fn clear(&mut self) {
        self.cursor = None;
        self.detector = None;
    }

    pub fn step(
        &mut self,
        direction: Direction,
        items: &[ItemBox],
        metrics: &ScrollMetrics,
    ) -> StepOutcome {
        self.detector = None;

        let next = match self.cursor {
            Some(index) => index as i64 + direction.delta(),
            None => {
                // First item below the top of the viewport anchors the selection
                let anchor = items
                    .iter()
                    .position(|item| item.top - self.offset > metrics.scroll_top)
                    .unwrap_or(items.len()) as i64;
                match direction {
                    Direction::Forward => anchor,
                    Direction::Backward => anchor - 1,
                }
            }
        };

        if next < 0 || next >= items.len() as i64 {
            debug!("Selection overflow {:?}", direction);
            return StepOutcome::Overflow(direction);
        }

        let index = next as usize;
        self.cursor = Some(index);
        StepOutcome::Selected {
            index,
            scroll_to: self.scroll_target(&items[index]),
        }
    }

    /// Select the first or last item of a freshly loaded page
    pub fn seed(&mut self, direction: Direction, items: &[ItemBox]) -> Option<StepOutcome> {
        self.detector = None;
        let index = match direction {
            Direction::Forward => 0,
            Direction::Backward => items.len().checked_sub(1)?,
        };
        let item = items.get(index)?;
        self.cursor = Some(index);
        Some(StepOutcome::Selected {
            index,
            scroll_to: self.scroll_target(item),
        })
    }

    fn scroll_target(&self, item: &ItemBox) -> i64 {
        (item.top - self.offset).max(0)
    }

    /// Programmatic scroll to `target` finished; start watching for manual scrolls
    pub fn scroll_settled(&mut self, target: i64) {
        if self.cursor.is_some() {
            self.detector = Some(target);
        }
    }

    /// Returns true when a manual scroll cleared the selection
    pub fn on_user_scroll(&mut self, metrics: &ScrollMetrics) -> bool {
        let Some(target) = self.detector else {
            return false;
        };
        if metrics.is_at_bottom() {
            return false;
        }
        if (metrics.scroll_top - target).abs() > self.tolerance {
            debug!("Scrolled away from selection");
            self.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<ItemBox> {
        (0..n)
            .map(|i| ItemBox {
                top: i as i64 * 100,
                height: 90,
                link: Some(format!("/post-{}/", i)),
            })
            .collect()
    }

    fn at(scroll_top: i64) -> ScrollMetrics {
        ScrollMetrics::new(scroll_top, 50, 1000)
    }

    #[test]
    fn test_anchor_without_cursor() {
        let items = items(5);
        let mut nav = SelectionNavigator::new(0, 40);
        // Item 2 (top 200) is the first below scroll_top 150
        assert_eq!(
            nav.step(Direction::Forward, &items, &at(150)),
            StepOutcome::Selected { index: 2, scroll_to: 200 }
        );

        let mut nav = SelectionNavigator::new(0, 40);
        assert_eq!(
            nav.step(Direction::Backward, &items, &at(150)),
            StepOutcome::Selected { index: 1, scroll_to: 100 }
        );
    }

    #[test]
    fn test_offset_shifts_anchor_and_target() {
        let items = items(5);
        let mut nav = SelectionNavigator::new(20, 40);
        // 100 - 20 > 170 fails, 200 - 20 > 170 holds
        assert_eq!(
            nav.step(Direction::Forward, &items, &at(170)),
            StepOutcome::Selected { index: 2, scroll_to: 180 }
        );
    }

    #[test]
    fn test_overflow_at_last_item() {
        let items = items(5);
        let mut nav = SelectionNavigator::new(0, 40);
        for expected in 0..5 {
            let outcome = nav.step(Direction::Forward, &items, &at(-1));
            assert!(matches!(outcome, StepOutcome::Selected { index, .. } if index == expected));
        }
        assert_eq!(
            nav.step(Direction::Forward, &items, &at(400)),
            StepOutcome::Overflow(Direction::Forward)
        );
        assert_eq!(nav.selected(), Some(4));
    }

    #[test]
    fn test_backward_before_first_overflows() {
        let items = items(3);
        let mut nav = SelectionNavigator::new(0, 40);
        // Nothing below the fold means the anchor is past the end
        assert_eq!(
            nav.step(Direction::Backward, &items, &at(900)),
            StepOutcome::Selected { index: 2, scroll_to: 200 }
        );
        nav.step(Direction::Backward, &items, &at(200));
        nav.step(Direction::Backward, &items, &at(100));
        assert_eq!(
            nav.step(Direction::Backward, &items, &at(0)),
            StepOutcome::Overflow(Direction::Backward)
        );
    }

    #[test]
    fn test_seed() {
        let items = items(4);
        let mut nav = SelectionNavigator::new(0, 40);
        assert_eq!(
            nav.seed(Direction::Backward, &items),
            Some(StepOutcome::Selected { index: 3, scroll_to: 300 })
        );
        assert_eq!(nav.seed(Direction::Forward, &[]), None);
    }

    #[test]
    fn test_scroll_detection() {
        let items = items(5);
        let mut nav = SelectionNavigator::new(0, 40);
        nav.step(Direction::Forward, &items, &at(150));
        nav.scroll_settled(200);
        assert!(nav.is_detecting());

        assert!(!nav.on_user_scroll(&at(230)));
        assert_eq!(nav.selected(), Some(2));

        // Bottom of the document is ignored
        assert!(!nav.on_user_scroll(&ScrollMetrics::new(950, 50, 1000)));

        assert!(nav.on_user_scroll(&at(260)));
        assert_eq!(nav.selected(), None);
        assert!(!nav.is_detecting());
    }

    #[test]
    fn test_detector_only_armed_with_selection() {
        let mut nav = SelectionNavigator::new(0, 40);
        nav.scroll_settled(100);
        assert!(!nav.is_detecting());
    }
}
