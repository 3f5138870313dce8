//! Momentum scrolling driven by the fling spline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use overscroll_animation::{AndroidFlingSpline, DecelerationRate, FlingCalculator};
use overscroll_core::{FrameCallbackRegistration, FrameClock, RuntimeHandle};

/// Decelerating scroll owned by the host view.
///
/// Positions and velocities are in device pixels. `min`/`max` bound where the
/// scroll may come to rest; passing the same value for both pins the landing.
pub trait MomentumScroller {
    fn fling(&self, start: i32, velocity: i32, min: i32, max: i32);

    /// Where the current (or last) fling comes to rest.
    fn final_position(&self) -> i32;

    fn is_finished(&self) -> bool;

    /// Stops in place; no further positions are written.
    fn abort(&self);

    /// Friction preset and display density used by subsequent flings.
    fn set_friction(&self, rate: DecelerationRate, density: f32);
}

struct MomentumRun {
    id: u64,
    start: i32,
    target: i32,
    duration_ms: i64,
    start_frame_time_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
}

impl MomentumRun {
    fn position_at(&self, elapsed_ms: i64) -> (i32, bool) {
        if elapsed_ms >= self.duration_ms {
            return (self.target, true);
        }
        let fraction = elapsed_ms as f32 / self.duration_ms as f32;
        let coefficient = AndroidFlingSpline::fling_position(fraction);
        let travelled = ((self.target - self.start) as f32 * coefficient).round() as i32;
        (self.start + travelled, false)
    }
}

type RunCell = Rc<RefCell<Option<MomentumRun>>>;
type ScrollCallback = Rc<dyn Fn(i32)>;

/// [`MomentumScroller`] that runs on the runtime's frame clock and writes
/// every intermediate position through `on_scroll`.
///
/// The whole travel is computed up front: the landing is the natural fling
/// distance clamped into `[min, max]`, and the spline shape is stretched over
/// it so the last frame lands exactly there.
pub struct DecayMomentumScroller {
    run: RunCell,
    frame_clock: FrameClock,
    calculator: Cell<FlingCalculator>,
    final_position: Cell<i32>,
    next_id: Cell<u64>,
    on_scroll: ScrollCallback,
}

impl DecayMomentumScroller {
    pub fn new<F>(runtime: RuntimeHandle, density: f32, on_scroll: F) -> Self
    where
        F: Fn(i32) + 'static,
    {
        Self {
            run: Rc::new(RefCell::new(None)),
            frame_clock: runtime.frame_clock(),
            calculator: Cell::new(FlingCalculator::with_rate(DecelerationRate::Normal, density)),
            final_position: Cell::new(0),
            next_id: Cell::new(1),
            on_scroll: Rc::new(on_scroll),
        }
    }
}

impl MomentumScroller for DecayMomentumScroller {
    fn fling(&self, start: i32, velocity: i32, min: i32, max: i32) {
        self.abort();

        let calculator = self.calculator.get();
        let travel = if velocity == 0 {
            0
        } else {
            (calculator.fling_distance(velocity as f32).round() as i32) * velocity.signum()
        };
        let target = start.saturating_add(travel).clamp(min, max.max(min));
        self.final_position.set(target);

        if target == start {
            log::trace!("momentum fling from {start} has nowhere to go");
            return;
        }

        let driving_velocity = if velocity != 0 {
            velocity
        } else {
            target - start
        };
        let duration_ms = calculator.fling_duration(driving_velocity as f32).max(1);
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        log::debug!(
            "momentum fling {start} -> {target} (v={velocity}, {duration_ms}ms, bounds [{min}, {max}])"
        );

        *self.run.borrow_mut() = Some(MomentumRun {
            id,
            start,
            target,
            duration_ms,
            start_frame_time_nanos: None,
            registration: None,
        });
        schedule_next_frame(
            self.run.clone(),
            self.frame_clock.clone(),
            self.on_scroll.clone(),
            id,
        );
    }

    fn final_position(&self) -> i32 {
        self.final_position.get()
    }

    fn is_finished(&self) -> bool {
        self.run.borrow().is_none()
    }

    fn abort(&self) {
        if let Some(run) = self.run.borrow_mut().take() {
            log::trace!("momentum fling {} aborted", run.id);
            drop(run.registration);
        }
    }

    fn set_friction(&self, rate: DecelerationRate, density: f32) {
        self.calculator.set(FlingCalculator::with_rate(rate, density));
    }
}

fn schedule_next_frame(run: RunCell, frame_clock: FrameClock, on_scroll: ScrollCallback, id: u64) {
    let weak = Rc::downgrade(&run);
    let clock = frame_clock.clone();
    let registration = frame_clock.with_frame_nanos(move |frame_time_nanos| {
        if let Some(run) = weak.upgrade() {
            on_frame(run, clock, on_scroll, id, frame_time_nanos);
        }
    });
    if let Some(current) = run.borrow_mut().as_mut() {
        if current.id == id {
            current.registration = Some(registration);
        }
    }
}

fn on_frame(
    run: RunCell,
    frame_clock: FrameClock,
    on_scroll: ScrollCallback,
    id: u64,
    frame_time_nanos: u64,
) {
    let (position, finished) = {
        let mut guard = run.borrow_mut();
        let Some(current) = guard.as_mut().filter(|current| current.id == id) else {
            return;
        };
        current.registration = None;
        let start_time = *current.start_frame_time_nanos.get_or_insert(frame_time_nanos);
        let elapsed_ms = (frame_time_nanos.saturating_sub(start_time) / 1_000_000) as i64;
        let sample = current.position_at(elapsed_ms);
        if sample.1 {
            *guard = None;
        }
        sample
    };

    on_scroll(position);

    if finished {
        return;
    }
    let still_current = run.borrow().as_ref().is_some_and(|current| current.id == id);
    if still_current {
        schedule_next_frame(run, frame_clock, on_scroll, id);
    }
}
