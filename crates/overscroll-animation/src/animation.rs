//! Time-based tweens with easing curves.
//!
//! [`TweenAnimation`] is the animation executor the bounce-back runs on. It
//! advances on the runtime's frame clock and reports every intermediate value.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use overscroll_core::{FrameCallbackRegistration, FrameClock, RuntimeHandle};

/// Trait for types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

/// Easing functions for animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Linear interpolation (no easing).
    LinearEasing,
    /// Ease in using cubic curve.
    EaseIn,
    /// Ease out using cubic curve.
    EaseOut,
    /// Ease in and out using cubic curve.
    EaseInOut,
    /// Fast out, slow in (material design standard).
    FastOutSlowInEasing,
    /// Quartic ease-out: `1 - (1 - p)^4`. Default for overscroll bounce-back.
    QuartOut,
}

impl Easing {
    /// Apply the easing function to a linear fraction [0, 1].
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::LinearEasing => fraction,
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, fraction),
            Easing::FastOutSlowInEasing => cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction),
            Easing::QuartOut => {
                let remaining = 1.0 - fraction.clamp(0.0, 1.0);
                1.0 - remaining.powi(4)
            }
        }
    }
}

/// Cubic bezier curve approximation for easing.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    fn sample_curve(a: f32, b: f32, c: f32, t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    fn sample_derivative(a: f32, b: f32, c: f32, t: f32) -> f32 {
        (3.0 * a * t + 2.0 * b) * t + c
    }

    // Newton-Raphson for the parametric t matching the x fraction.
    let mut t = fraction;
    let mut newton_success = false;
    for _ in 0..8 {
        let x = sample_curve(ax, bx, cx, t) - fraction;
        if x.abs() < 1e-6 {
            newton_success = true;
            break;
        }
        let dx = sample_derivative(ax, bx, cx, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    if !newton_success {
        let mut t0 = 0.0;
        let mut t1 = 1.0;
        t = fraction;
        for _ in 0..16 {
            let x = sample_curve(ax, bx, cx, t);
            let delta = x - fraction;
            if delta.abs() < 1e-6 {
                break;
            }
            if delta > 0.0 {
                t1 = t;
            } else {
                t0 = t;
            }
            t = 0.5 * (t0 + t1);
        }
    }

    sample_curve(ay, by, cy, t)
}

/// Animation specification combining duration and easing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Duration in milliseconds.
    pub duration_millis: u64,
    /// Easing function to apply.
    pub easing: Easing,
}

impl AnimationSpec {
    /// Create a tween animation with duration and easing.
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
        }
    }

    /// Eased progress for `elapsed_nanos` into the animation, and whether it is done.
    pub fn progress_at(&self, elapsed_nanos: u64) -> (f32, bool) {
        let duration_nanos = (self.duration_millis * 1_000_000).max(1);
        let linear = (elapsed_nanos as f32 / duration_nanos as f32).clamp(0.0, 1.0);
        if linear >= 1.0 {
            (1.0, true)
        } else {
            (self.easing.transform(linear), false)
        }
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::tween(400, Easing::QuartOut)
    }
}

type UpdateCallback = Rc<dyn Fn(f32)>;

struct TweenState {
    id: u64,
    start: f32,
    target: f32,
    spec: AnimationSpec,
    start_frame_time_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
    on_update: UpdateCallback,
    on_end: Option<Box<dyn FnOnce()>>,
}

/// Drives an `f32` from a start value to a target over a tween [`AnimationSpec`].
///
/// At most one run is active; starting a new one cancels the previous run
/// without invoking its end callback. The first frame reports the start
/// value and the last frame reports the target exactly.
pub struct TweenAnimation {
    state: Rc<RefCell<Option<TweenState>>>,
    frame_clock: FrameClock,
    next_id: Rc<Cell<u64>>,
}

impl TweenAnimation {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            state: Rc::new(RefCell::new(None)),
            frame_clock: runtime.frame_clock(),
            next_id: Rc::new(Cell::new(1)),
        }
    }

    pub fn start<F, G>(&self, start: f32, target: f32, spec: AnimationSpec, on_update: F, on_end: G)
    where
        F: Fn(f32) + 'static,
        G: FnOnce() + 'static,
    {
        self.cancel();

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        *self.state.borrow_mut() = Some(TweenState {
            id,
            start,
            target,
            spec,
            start_frame_time_nanos: None,
            registration: None,
            on_update: Rc::new(on_update),
            on_end: Some(Box::new(on_end)),
        });

        schedule_next_frame(self.state.clone(), self.frame_clock.clone(), id);
    }

    /// Stops the current run. Its end callback is dropped, not invoked.
    pub fn cancel(&self) {
        if let Some(state) = self.state.borrow_mut().take() {
            drop(state.registration);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_some()
    }
}

impl Clone for TweenAnimation {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            frame_clock: self.frame_clock.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

fn schedule_next_frame(state: Rc<RefCell<Option<TweenState>>>, frame_clock: FrameClock, id: u64) {
    let weak = Rc::downgrade(&state);
    let clock_for_frame = frame_clock.clone();
    let registration = frame_clock.with_frame_nanos(move |frame_time_nanos| {
        if let Some(state) = weak.upgrade() {
            on_frame(state, clock_for_frame, id, frame_time_nanos);
        }
    });

    if let Some(tween) = state.borrow_mut().as_mut() {
        if tween.id == id {
            tween.registration = Some(registration);
        }
    }
}

fn on_frame(
    state: Rc<RefCell<Option<TweenState>>>,
    frame_clock: FrameClock,
    id: u64,
    frame_time_nanos: u64,
) {
    let (value, finished, on_update) = {
        let mut guard = state.borrow_mut();
        let Some(tween) = guard.as_mut().filter(|tween| tween.id == id) else {
            return;
        };
        tween.registration = None;

        let start_time = *tween.start_frame_time_nanos.get_or_insert(frame_time_nanos);
        let elapsed = frame_time_nanos.saturating_sub(start_time);
        let (progress, finished) = tween.spec.progress_at(elapsed);
        let value = if finished {
            tween.target
        } else {
            tween.start.lerp(&tween.target, progress)
        };
        (value, finished, tween.on_update.clone())
    };

    log::trace!("tween {id} value={value} finished={finished}");
    on_update(value);

    // The update callback may have cancelled or replaced this run.
    let still_current = state
        .borrow()
        .as_ref()
        .is_some_and(|tween| tween.id == id);
    if !still_current {
        return;
    }

    if finished {
        let on_end = state
            .borrow_mut()
            .take()
            .and_then(|mut tween| tween.on_end.take());
        if let Some(on_end) = on_end {
            on_end();
        }
    } else {
        schedule_next_frame(state, frame_clock, id);
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
