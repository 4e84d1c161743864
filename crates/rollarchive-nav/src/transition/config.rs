//! Durations derived from `AnimationConfig`

use std::time::Duration;

pub use rollarchive_core::config::AnimationConfig;

pub trait AnimationConfigExt {
    fn outgoing_duration(&self) -> Duration;

    fn incoming_duration(&self) -> Duration;

    fn scroll_duration(&self) -> Duration;

    /// Frame interval while something is animating
    fn tick_duration(&self) -> Duration;
}

impl AnimationConfigExt for AnimationConfig {
    #[inline]
    fn outgoing_duration(&self) -> Duration {
        Duration::from_millis(self.outgoing_duration_ms)
    }

    #[inline]
    fn incoming_duration(&self) -> Duration {
        Duration::from_millis(self.incoming_duration_ms)
    }

    #[inline]
    fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    #[inline]
    fn tick_duration(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.fps as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollarchive_core::EasingType;

    #[test]
    fn test_default_config() {
        let config = AnimationConfig::default();
        assert_eq!(config.outgoing_easing, EasingType::EaseIn);
        assert_eq!(config.incoming_easing, EasingType::EaseOut);
        assert_eq!(config.outgoing_duration(), Duration::from_millis(200));
        assert_eq!(config.incoming_duration(), Duration::from_millis(450));
    }

    #[test]
    fn test_tick_duration_fallback() {
        let config = AnimationConfig {
            fps: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_duration(), Duration::from_millis(16));
    }
}
