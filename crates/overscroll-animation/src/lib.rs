//! Animation primitives for the elastic overscroll controller.
//!
//! This crate provides easing curves, a frame-driven tween, and the
//! spline-based fling physics used to predict where momentum lands.

pub mod animation;
pub mod decay_spec;

pub use animation::{AnimationSpec, Easing, Lerp, TweenAnimation};
pub use decay_spec::{predict_fling_target, AndroidFlingSpline, DecelerationRate, FlingCalculator};

pub mod prelude {
    pub use crate::animation::{AnimationSpec, Easing, Lerp, TweenAnimation};
    pub use crate::decay_spec::{predict_fling_target, DecelerationRate, FlingCalculator};
}
