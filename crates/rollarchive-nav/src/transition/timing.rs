//! Progress and interpolation helpers

use std::time::{Duration, Instant};

/// Progress in [0, 1] of an animation started at `start`
#[inline]
pub fn progress(start: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start: Instant, duration: Duration, now: Instant) -> bool {
    now.saturating_duration_since(start) >= duration
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolation for row positions
#[inline]
pub fn lerp_i64(from: i64, to: i64, t: f64) -> i64 {
    lerp(from as f64, to as f64, t).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert_eq!(lerp_i64(10, -10, 0.5), 0);
        assert_eq!(lerp_i64(0, 100, 1.0), 100);
    }

    #[test]
    fn test_progress() {
        let start = Instant::now();
        let duration = Duration::from_millis(100);
        assert_eq!(progress(start, duration, start), 0.0);
        assert!((progress(start, duration, start + Duration::from_millis(50)) - 0.5).abs() < 0.001);
        assert_eq!(progress(start, duration, start + Duration::from_secs(1)), 1.0);
        assert_eq!(progress(start, Duration::ZERO, start), 1.0);
    }

    #[test]
    fn test_is_complete() {
        let start = Instant::now();
        let duration = Duration::from_millis(100);
        assert!(!is_complete(start, duration, start));
        assert!(is_complete(start, duration, start + duration));
    }
}
