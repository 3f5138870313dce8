//! Eased return of the overscroll translation to rest.

use overscroll_animation::{AnimationSpec, TweenAnimation};
use overscroll_core::RuntimeHandle;

/// Observer payload for an overscroll value: whether it sits past the start
/// edge (zero counts as start) and its magnitude in whole pixels.
pub fn overscroll_report(value: f32) -> (bool, i32) {
    (value <= 0.0, value.abs() as i32)
}

/// Animates an overscroll translation back to zero; one run at a time.
#[derive(Clone)]
pub struct BounceBackAnimator {
    tween: TweenAnimation,
}

impl BounceBackAnimator {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            tween: TweenAnimation::new(runtime),
        }
    }

    /// Cancels any run in flight, then eases `from` to exactly 0.
    pub fn start<F, G>(&self, from: f32, spec: AnimationSpec, on_frame: F, on_end: G)
    where
        F: Fn(f32) + 'static,
        G: FnOnce() + 'static,
    {
        log::debug!(
            "bounce-back from {from} over {}ms ({:?})",
            spec.duration_millis,
            spec.easing
        );
        self.tween.start(from, 0.0, spec, on_frame, on_end);
    }

    pub fn cancel(&self) {
        self.tween.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.tween.is_running()
    }
}
