//! Animation engine for page transitions and selection scrolling
//!
//! - `easing` - pure easing curves
//! - `timing` - progress and interpolation helpers
//! - `config` - durations derived from the animation settings
//! - `animation` - the page slide and the scroll animator built on the above
//!
//! Everything takes the current `Instant` from the caller so the host loop
//! decides when frames happen.

pub mod config;
pub mod easing;
pub mod timing;

pub mod animation;

pub use animation::{PageTransition, ScrollAnimator, TransitionFrame, TransitionPhase};
pub use config::AnimationConfigExt;
pub use easing::{EasingType, EasingTypeExt};
