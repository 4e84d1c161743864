//! Discrete page slider
//!
//! The slider holds an integer value in `[minimum, maximum]` and reports
//! interactions as returned events instead of callbacks. Positions along the
//! track are given as fractions in `[0, 1]`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderOptions {
    pub minimum: u32,
    pub maximum: u32,
    pub initial_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderEvent {
    /// Value moved while dragging; not yet committed
    Slide(u32),
    /// Value committed
    Change(u32),
}

#[derive(Debug, Clone)]
pub struct PageSlider {
    minimum: u32,
    maximum: u32,
    value: u32,
    /// Value when the current drag began
    drag_origin: Option<u32>,
}

impl PageSlider {
    pub fn new(options: SliderOptions) -> Self {
        let maximum = options.maximum.max(options.minimum);
        Self {
            minimum: options.minimum,
            maximum,
            value: options.initial_value.clamp(options.minimum, maximum),
            drag_origin: None,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Handle position as a fraction of the track
    pub fn fraction(&self) -> f64 {
        if self.maximum == self.minimum {
            return 0.0;
        }
        (self.value - self.minimum) as f64 / (self.maximum - self.minimum) as f64
    }

    /// Discrete value nearest to a track position
    pub fn value_at(&self, fraction: f64) -> u32 {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let span = (self.maximum - self.minimum) as f64;
        self.minimum + (fraction * span).round() as u32
    }

    pub fn begin_drag(&mut self) {
        self.drag_origin = Some(self.value);
    }

    pub fn drag_to(&mut self, fraction: f64) -> Option<SliderEvent> {
        if self.drag_origin.is_none() {
            self.begin_drag();
        }
        let value = self.value_at(fraction);
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(SliderEvent::Slide(value))
    }

    pub fn end_drag(&mut self) -> Option<SliderEvent> {
        let origin = self.drag_origin.take()?;
        (self.value != origin).then_some(SliderEvent::Change(self.value))
    }

    /// Jump straight to a clicked track position
    pub fn click_at(&mut self, fraction: f64) -> Option<SliderEvent> {
        let value = self.value_at(fraction);
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(SliderEvent::Change(value))
    }

    pub fn set_value_by(&mut self, delta: i64) -> Option<SliderEvent> {
        let value = (self.value as i64 + delta).clamp(self.minimum as i64, self.maximum as i64) as u32;
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(SliderEvent::Change(value))
    }

    /// Replace the range without raising events
    pub fn set_bounds(&mut self, minimum: u32, maximum: u32) {
        self.minimum = minimum;
        self.maximum = maximum.max(minimum);
        self.value = self.value.clamp(self.minimum, self.maximum);
    }

    /// Move the handle without raising events
    pub fn set_value(&mut self, value: u32) {
        self.value = value.clamp(self.minimum, self.maximum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider(max: u32, value: u32) -> PageSlider {
        PageSlider::new(SliderOptions {
            minimum: 1,
            maximum: max,
            initial_value: value,
        })
    }

    #[test]
    fn test_drag_reports_slides_then_one_change() {
        let mut s = slider(5, 5);
        s.begin_drag();
        assert_eq!(s.drag_to(0.5), Some(SliderEvent::Slide(3)));
        assert_eq!(s.drag_to(0.51), None);
        assert_eq!(s.drag_to(0.25), Some(SliderEvent::Slide(2)));
        assert_eq!(s.end_drag(), Some(SliderEvent::Change(2)));
        assert!(!s.is_dragging());
        assert_eq!(s.end_drag(), None);
    }

    #[test]
    fn test_drag_back_to_origin_is_not_a_change() {
        let mut s = slider(5, 4);
        s.begin_drag();
        s.drag_to(0.0);
        s.drag_to(0.75);
        assert_eq!(s.value(), 4);
        assert_eq!(s.end_drag(), None);
    }

    #[test]
    fn test_click() {
        let mut s = slider(5, 5);
        assert_eq!(s.click_at(0.0), Some(SliderEvent::Change(1)));
        assert_eq!(s.click_at(0.1), None);
    }

    #[test]
    fn test_set_value_by_clamps() {
        let mut s = slider(5, 5);
        assert_eq!(s.set_value_by(1), None);
        assert_eq!(s.set_value_by(-1), Some(SliderEvent::Change(4)));
        s.set_value(1);
        assert_eq!(s.set_value_by(-1), None);
        assert_eq!(s.set_value_by(10), Some(SliderEvent::Change(5)));
    }

    #[test]
    fn test_silent_updates_clamp() {
        let mut s = slider(5, 5);
        s.set_bounds(1, 3);
        assert_eq!(s.value(), 3);
        s.set_value(9);
        assert_eq!(s.value(), 3);
        s.set_value(0);
        assert_eq!(s.value(), 1);
    }

    #[test]
    fn test_fraction() {
        let s = slider(5, 3);
        assert!((s.fraction() - 0.5).abs() < 0.001);
        assert_eq!(slider(1, 1).fraction(), 0.0);
    }
}
