//! Page slide transition and selection scroll animator

use std::time::{Duration, Instant};

use super::config::{AnimationConfig, AnimationConfigExt};
use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp_i64, progress};
use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Old content sliding out
    Outgoing,
    /// New content sliding in
    Incoming,
}

/// One frame of a page transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub phase: TransitionPhase,
    /// Horizontal displacement as a fraction of the content width; 0 is at rest
    pub offset: f64,
}

/// Two-phase slide between pages
///
/// Forward travel moves content towards the left, backward towards the right.
#[derive(Debug, Clone)]
pub struct PageTransition {
    direction: Direction,
    phase: TransitionPhase,
    phase_start: Instant,
    outgoing: (Duration, EasingType),
    incoming: (Duration, EasingType),
}

impl PageTransition {
    pub fn new(direction: Direction, config: &AnimationConfig, now: Instant) -> Self {
        Self {
            direction,
            phase: TransitionPhase::Outgoing,
            phase_start: now,
            outgoing: (config.outgoing_duration(), config.outgoing_easing),
            incoming: (config.incoming_duration(), config.incoming_easing),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Advance to `now`; `None` once the incoming slide has finished
    pub fn update(&mut self, now: Instant) -> Option<TransitionFrame> {
        let sign = -(self.direction.delta() as f64);

        if self.phase == TransitionPhase::Outgoing {
            let (duration, easing) = self.outgoing;
            if !is_complete(self.phase_start, duration, now) {
                let t = easing.apply(progress(self.phase_start, duration, now));
                return Some(TransitionFrame {
                    phase: TransitionPhase::Outgoing,
                    offset: sign * t,
                });
            }
            self.phase = TransitionPhase::Incoming;
            self.phase_start += duration;
        }

        let (duration, easing) = self.incoming;
        if is_complete(self.phase_start, duration, now) {
            return None;
        }
        let t = easing.apply(progress(self.phase_start, duration, now));
        Some(TransitionFrame {
            phase: TransitionPhase::Incoming,
            offset: -sign * (1.0 - t),
        })
    }
}

#[derive(Debug, Clone)]
struct ActiveScroll {
    start: Instant,
    from: i64,
    to: i64,
    duration: Duration,
    easing: EasingType,
}

/// Animated vertical scrolling towards a selected item
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    animation: Option<ActiveScroll>,
    current: i64,
    enabled: bool,
    duration: Duration,
    easing: EasingType,
    /// Target of a programmatic scroll that has just completed
    settled: Option<i64>,
}

impl ScrollAnimator {
    pub fn new(config: &AnimationConfig, enabled: bool) -> Self {
        Self {
            animation: None,
            current: 0,
            enabled: enabled && config.scroll_duration_ms > 0,
            duration: config.scroll_duration(),
            easing: config.incoming_easing,
            settled: None,
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[inline]
    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn target(&self) -> i64 {
        self.animation.as_ref().map(|a| a.to).unwrap_or(self.current)
    }

    /// Jump without animation; manual scrolling never settles a target
    pub fn set_scroll(&mut self, position: i64) {
        self.animation = None;
        self.current = position.max(0);
    }

    /// Start a programmatic scroll
    pub fn scroll_to(&mut self, target: i64, now: Instant) {
        let target = target.max(0);
        if !self.enabled || self.current == target {
            self.animation = None;
            self.current = target;
            self.settled = Some(target);
            return;
        }

        self.animation = Some(ActiveScroll {
            start: now,
            from: self.current,
            to: target,
            duration: self.duration,
            easing: self.easing,
        });
    }

    /// Advance the animation and return the current position
    pub fn update(&mut self, now: Instant) -> i64 {
        if let Some(ref anim) = self.animation {
            if is_complete(anim.start, anim.duration, now) {
                self.current = anim.to;
                self.settled = Some(anim.to);
                self.animation = None;
            } else {
                let t = anim.easing.apply(progress(anim.start, anim.duration, now));
                self.current = lerp_i64(anim.from, anim.to, t);
            }
        }
        self.current
    }

    /// Target of the programmatic scroll that finished since the last call
    pub fn take_settled(&mut self) -> Option<i64> {
        self.settled.take()
    }

    pub fn cancel(&mut self) {
        self.animation = None;
        self.settled = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AnimationConfig {
        AnimationConfig {
            outgoing_easing: EasingType::Linear,
            incoming_easing: EasingType::Linear,
            outgoing_duration_ms: 100,
            incoming_duration_ms: 200,
            scroll_duration_ms: 100,
            fps: 60,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_forward_transition_phases() {
        let start = Instant::now();
        let mut transition = PageTransition::new(Direction::Forward, &config(), start);

        let frame = transition.update(start + ms(50)).unwrap();
        assert_eq!(frame.phase, TransitionPhase::Outgoing);
        assert!((frame.offset + 0.5).abs() < 0.001);

        let frame = transition.update(start + ms(200)).unwrap();
        assert_eq!(frame.phase, TransitionPhase::Incoming);
        assert!((frame.offset - 0.5).abs() < 0.001);

        assert!(transition.update(start + ms(300)).is_none());
    }

    #[test]
    fn test_backward_transition_mirrors() {
        let start = Instant::now();
        let mut transition = PageTransition::new(Direction::Backward, &config(), start);
        let frame = transition.update(start + ms(50)).unwrap();
        assert!((frame.offset - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_late_update_finishes_at_once() {
        let start = Instant::now();
        let mut transition = PageTransition::new(Direction::Forward, &config(), start);
        assert!(transition.update(start + ms(1000)).is_none());
        assert_eq!(transition.phase(), TransitionPhase::Incoming);
    }

    #[test]
    fn test_scroll_settles_once() {
        let start = Instant::now();
        let mut animator = ScrollAnimator::new(&config(), true);

        animator.scroll_to(40, start);
        assert!(animator.is_animating());
        assert_eq!(animator.update(start + ms(50)), 20);
        assert_eq!(animator.take_settled(), None);

        assert_eq!(animator.update(start + ms(100)), 40);
        assert_eq!(animator.take_settled(), Some(40));
        assert_eq!(animator.take_settled(), None);
    }

    #[test]
    fn test_instant_scroll_when_disabled() {
        let mut animator = ScrollAnimator::new(&config(), false);
        animator.scroll_to(30, Instant::now());
        assert!(!animator.is_animating());
        assert_eq!(animator.current(), 30);
        assert_eq!(animator.take_settled(), Some(30));
    }

    #[test]
    fn test_manual_scroll_cancels() {
        let start = Instant::now();
        let mut animator = ScrollAnimator::new(&config(), true);
        animator.scroll_to(40, start);
        animator.set_scroll(5);
        assert!(!animator.is_animating());
        assert_eq!(animator.update(start + ms(200)), 5);
        assert_eq!(animator.take_settled(), None);
    }
}
