use crate::config::{ConfigError, OverscrollConfig, SnapAlignment};
use crate::controller::{ControllerPhase, OverscrollController};
use crate::host::{
    ContentExtents, Orientation, OverscrollListener, Point, PointerEvent, PointerPhase,
    ScrollChangeListener, ScrollHost,
};
use crate::momentum::{DecayMomentumScroller, MomentumScroller};
use crate::snap::{quantize, SnapTarget};
use overscroll_animation::{predict_fling_target, DecelerationRate};
use overscroll_core::{DefaultScheduler, Runtime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const FRAME_NANOS: u64 = 16_000_000;

struct RecordingHost {
    position: Cell<i32>,
    extents: Cell<Option<ContentExtents>>,
    translations: RefCell<Vec<f32>>,
}

impl ScrollHost for RecordingHost {
    fn scroll_position(&self) -> i32 {
        self.position.get()
    }

    fn extents(&self) -> Option<ContentExtents> {
        self.extents.get()
    }

    fn set_content_translation(&self, translation: f32) {
        self.translations.borrow_mut().push(translation);
    }
}

#[derive(Default)]
struct RecordingListener {
    overscrolls: RefCell<Vec<(bool, i32)>>,
    scrolls: RefCell<Vec<(i32, i32)>>,
}

impl OverscrollListener for RecordingListener {
    fn on_overscrolling(&self, toward_start: bool, magnitude: i32) {
        self.overscrolls.borrow_mut().push((toward_start, magnitude));
    }
}

impl ScrollChangeListener for RecordingListener {
    fn on_scroll_changed(&self, new_position: i32, old_position: i32) {
        self.scrolls.borrow_mut().push((new_position, old_position));
    }
}

// Real momentum physics, with every launch recorded.
struct CountingScroller {
    inner: DecayMomentumScroller,
    flings: RefCell<Vec<(i32, i32, i32, i32)>>,
}

impl MomentumScroller for CountingScroller {
    fn fling(&self, start: i32, velocity: i32, min: i32, max: i32) {
        self.flings.borrow_mut().push((start, velocity, min, max));
        self.inner.fling(start, velocity, min, max);
    }

    fn final_position(&self) -> i32 {
        self.inner.final_position()
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn abort(&self) {
        self.inner.abort();
    }

    fn set_friction(&self, rate: DecelerationRate, density: f32) {
        self.inner.set_friction(rate, density);
    }
}

struct Harness {
    runtime: Runtime,
    host: Rc<RecordingHost>,
    scroller: Rc<CountingScroller>,
    listener: Rc<RecordingListener>,
    controller: OverscrollController,
}

impl Harness {
    fn new(extents: Option<ContentExtents>, position: i32) -> Self {
        let runtime = Runtime::new(Rc::new(DefaultScheduler));
        let host = Rc::new(RecordingHost {
            position: Cell::new(position),
            extents: Cell::new(extents),
            translations: RefCell::new(Vec::new()),
        });
        let sink = Rc::clone(&host);
        let scroller = Rc::new(CountingScroller {
            inner: DecayMomentumScroller::new(runtime.handle(), 1.0, move |value| {
                sink.position.set(value)
            }),
            flings: RefCell::new(Vec::new()),
        });
        let controller = OverscrollController::new(
            Orientation::Vertical,
            runtime.handle(),
            host.clone(),
            scroller.clone(),
        );
        let listener = Rc::new(RecordingListener::default());
        controller.set_overscroll_listener(Some(listener.clone()));
        Self {
            runtime,
            host,
            scroller,
            listener,
            controller,
        }
    }

    fn scrolled(position: i32) -> Self {
        Self::new(Some(ContentExtents::new(2_000, 800)), position)
    }

    fn pointer(&self, phase: PointerPhase, y: f32) -> bool {
        self.controller
            .on_pointer_event(&PointerEvent::new(phase, Point::new(0.0, y)))
    }

    fn timed_pointer(&self, phase: PointerPhase, y: f32, uptime_millis: i64) -> bool {
        self.controller
            .on_pointer_event(&PointerEvent::new(phase, Point::new(0.0, y)).at_uptime(uptime_millis))
    }

    fn pump_millis(&self, millis: u64) {
        let handle = self.runtime.handle();
        let end = handle.now_nanos() + millis * 1_000_000;
        let mut time = handle.now_nanos();
        while time < end {
            time += FRAME_NANOS;
            handle.drain_frame_callbacks(time);
        }
    }

    fn last_translation(&self) -> Option<f32> {
        self.host.translations.borrow().last().copied()
    }

    fn overscrolls(&self) -> Vec<(bool, i32)> {
        self.listener.overscrolls.borrow().clone()
    }

    fn flings(&self) -> Vec<(i32, i32, i32, i32)> {
        self.scroller.flings.borrow().clone()
    }
}

// ----------------------------------------------------------------------
// Dragging
// ----------------------------------------------------------------------

#[test]
fn drag_past_start_stretches_with_growing_resistance() {
    let harness = Harness::scrolled(0);

    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 210.0);
    harness.pointer(PointerPhase::Move, 320.0);

    // 110 / (4 / (1 - 0.2²)) = 26.4, then 110 / (4 / (1 - 0.2325²)) = 26.01.
    assert_eq!(harness.controller.overscroll_translation(), -52.0);
    assert_eq!(*harness.host.translations.borrow(), vec![26.0, 52.0]);
    assert_eq!(harness.overscrolls(), vec![(true, 26), (true, 52)]);
    assert_eq!(harness.controller.phase(), ControllerPhase::Dragging);
}

#[test]
fn drag_past_end_stretches_toward_end() {
    let harness = Harness::scrolled(1_200);

    harness.pointer(PointerPhase::Down, 500.0);
    harness.pointer(PointerPhase::Move, 390.0);

    assert_eq!(harness.controller.overscroll_translation(), 26.0);
    assert_eq!(harness.last_translation(), Some(-26.0));
    assert_eq!(harness.overscrolls(), vec![(false, 26)]);
}

#[test]
fn disabled_start_edge_does_not_stretch() {
    let harness = Harness::scrolled(0);
    harness.controller.set_disable_bounce(true, false);

    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 250.0);

    assert_eq!(harness.controller.overscroll_translation(), 0.0);
    assert!(harness.host.translations.borrow().is_empty());
    assert!(harness.overscrolls().is_empty());
}

#[test]
fn drag_inside_content_never_stretches() {
    let harness = Harness::scrolled(500);

    harness.pointer(PointerPhase::Down, 300.0);
    harness.pointer(PointerPhase::Move, 400.0);
    harness.pointer(PointerPhase::Move, 200.0);

    assert_eq!(harness.controller.overscroll_translation(), 0.0);
    assert!(harness.host.translations.borrow().is_empty());
}

#[test]
fn off_axis_move_is_passed_through() {
    let harness = Harness::scrolled(0);
    harness.pointer(PointerPhase::Down, 100.0);

    let sideways = PointerEvent::new(PointerPhase::Move, Point::new(80.0, 150.0))
        .with_historical(Point::new(0.0, 100.0));
    assert!(!harness.controller.on_pointer_event(&sideways));
    assert!(harness.host.translations.borrow().is_empty());

    // Only the travel since the sideways move counts: 110 px, not 160.
    let along = PointerEvent::new(PointerPhase::Move, Point::new(80.0, 260.0))
        .with_historical(Point::new(80.0, 150.0));
    assert!(harness.controller.on_pointer_event(&along));
    assert_eq!(harness.controller.overscroll_translation(), -26.0);
}

#[test]
fn fully_damped_step_at_end_edge_still_notifies() {
    let harness = Harness::scrolled(1_200);

    harness.pointer(PointerPhase::Down, 500.0);
    harness.pointer(PointerPhase::Move, 390.0);
    // 1 / (4 / (1 - 0.2325²)) truncates to 0.
    harness.pointer(PointerPhase::Move, 389.0);

    assert_eq!(harness.controller.overscroll_translation(), 26.0);
    assert_eq!(harness.overscrolls(), vec![(false, 26), (false, 26)]);
}

#[test]
fn missing_content_makes_drag_and_fling_no_ops() {
    let harness = Harness::new(None, 0);

    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 300.0);
    harness.controller.on_release(Some(5_000.0));

    assert!(harness.host.translations.borrow().is_empty());
    assert!(harness.flings().is_empty());
    assert_eq!(harness.controller.fling_and_snap(1_000), None);
    assert_eq!(harness.controller.overscroll_distance(10), 0);
}

#[test]
fn snapping_without_content_still_goes_idle() {
    let harness = Harness::new(None, 0);
    harness
        .controller
        .set_snap(100.0, SnapAlignment::Start)
        .expect("valid snap interval");

    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Up, 100.0);
    harness.pump_millis(5_000);

    assert!(harness.flings().is_empty());
    assert_eq!(harness.controller.phase(), ControllerPhase::Idle);
    assert!(!harness.runtime.handle().has_pending_callbacks());
}

// ----------------------------------------------------------------------
// Release and bounce-back
// ----------------------------------------------------------------------

#[test]
fn bounce_back_returns_exactly_to_rest() {
    let harness = Harness::scrolled(0);
    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 210.0);
    harness.pointer(PointerPhase::Move, 320.0);

    harness.pointer(PointerPhase::Up, 320.0);
    assert_eq!(harness.controller.phase(), ControllerPhase::SnappingBack);
    assert!(harness.flings().is_empty());

    harness.pump_millis(480);

    assert_eq!(harness.controller.overscroll_translation(), 0.0);
    assert_eq!(harness.last_translation(), Some(0.0));
    let overscrolls = harness.overscrolls();
    assert_eq!(overscrolls[2], (true, 52));
    assert_eq!(overscrolls.last(), Some(&(true, 0)));
    let magnitudes: Vec<i32> = overscrolls[2..].iter().map(|(_, m)| *m).collect();
    assert!(magnitudes.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn controller_goes_idle_once_everything_has_stopped() {
    let harness = Harness::scrolled(0);
    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 200.0);
    harness.pointer(PointerPhase::Up, 200.0);

    // The settle poll during the bounce must not report idle.
    harness.pump_millis(200);
    assert_eq!(harness.controller.phase(), ControllerPhase::SnappingBack);

    harness.pump_millis(500);
    assert_eq!(harness.controller.phase(), ControllerPhase::Idle);
}

#[test]
fn new_drag_catches_the_bounce_mid_flight() {
    let harness = Harness::scrolled(0);
    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 210.0);
    harness.pointer(PointerPhase::Move, 320.0);
    harness.pointer(PointerPhase::Up, 320.0);
    harness.pump_millis(48);

    harness.pointer(PointerPhase::Down, 320.0);
    let caught = harness.controller.overscroll_translation();
    assert!(caught < 0.0 && caught > -52.0, "caught at {caught}");

    let writes = harness.host.translations.borrow().len();
    harness.pump_millis(500);
    assert_eq!(harness.host.translations.borrow().len(), writes);
    assert_eq!(harness.controller.overscroll_translation(), caught);
    assert_eq!(harness.controller.phase(), ControllerPhase::Dragging);
}

#[test]
fn cancel_bounces_back_without_flinging() {
    let harness = Harness::scrolled(500);
    harness.timed_pointer(PointerPhase::Down, 500.0, 0);
    harness.timed_pointer(PointerPhase::Move, 400.0, 10);
    harness.timed_pointer(PointerPhase::Move, 300.0, 20);
    harness.timed_pointer(PointerPhase::Cancel, 300.0, 30);

    assert!(harness.flings().is_empty());
    assert_eq!(harness.controller.phase(), ControllerPhase::SnappingBack);
}

// ----------------------------------------------------------------------
// Flinging
// ----------------------------------------------------------------------

#[test]
fn tracked_release_velocity_starts_a_capped_fling() {
    let harness = Harness::scrolled(500);
    harness.timed_pointer(PointerPhase::Down, 500.0, 0);
    harness.timed_pointer(PointerPhase::Move, 400.0, 10);
    harness.timed_pointer(PointerPhase::Move, 300.0, 20);
    harness.timed_pointer(PointerPhase::Up, 200.0, 30);

    // Finger moving up at 10_000 px/s scrolls forward, capped at 8_000.
    assert_eq!(harness.flings(), vec![(500, 8_000, 0, 1_200)]);
    assert_eq!(harness.controller.phase(), ControllerPhase::Flinging);
}

#[test]
fn fling_without_snapping_uses_full_range() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 0);
    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(2_000.0));

    assert_eq!(harness.flings(), vec![(0, 2_000, 0, 9_200)]);
    assert_eq!(harness.controller.phase(), ControllerPhase::Flinging);

    harness.pump_millis(4_000);

    let expected = predict_fling_target(0, 2_000, DecelerationRate::Normal, 0, 9_200, 1.0);
    assert_eq!(harness.host.position.get(), expected);
    assert_eq!(harness.controller.phase(), ControllerPhase::Idle);
}

#[test]
fn density_change_reaches_the_momentum_scroller() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 0);
    harness.controller.set_density(2.0).expect("valid density");

    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(2_000.0));
    harness.pump_millis(4_000);

    let expected = predict_fling_target(0, 2_000, DecelerationRate::Normal, 0, 9_200, 2.0);
    assert_eq!(harness.host.position.get(), expected);
    assert_eq!(harness.scroller.final_position(), expected);
}

#[test]
fn slow_release_does_not_fling() {
    let harness = Harness::scrolled(500);
    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(20.0));

    assert!(harness.flings().is_empty());
    assert_eq!(harness.controller.phase(), ControllerPhase::SnappingBack);
}

#[test]
fn fling_and_snap_lands_on_next_grid_line() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 130);
    harness
        .controller
        .set_snap(100.0, SnapAlignment::Start)
        .expect("valid snap interval");

    let target = harness.controller.fling_and_snap(5);

    assert_eq!(
        target,
        Some(SnapTarget {
            offset: 200,
            velocity: 705
        })
    );
    assert_eq!(harness.flings(), vec![(130, 705, 200, 200)]);
    harness.pump_millis(3_000);
    assert_eq!(harness.host.position.get(), 200);
}

#[test]
fn released_fling_with_snapping_is_pinned_to_grid() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 0);
    harness
        .controller
        .set_snap(100.0, SnapAlignment::Start)
        .expect("valid snap interval");

    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(2_000.0));

    let flings = harness.flings();
    assert_eq!(flings.len(), 1);
    let (start, _, min, max) = flings[0];
    assert_eq!(start, 0);
    assert_eq!(min, max);
    assert_eq!(min % 100, 0);

    harness.pump_millis(4_000);
    assert_eq!(harness.host.position.get(), min);
    // Already snapped during this gesture: settling must not launch again.
    assert_eq!(harness.flings().len(), 1);
    assert_eq!(harness.controller.phase(), ControllerPhase::Idle);
}

#[test]
fn resting_off_grid_snaps_once_to_nearest_line() {
    let harness = Harness::scrolled(130);
    harness
        .controller
        .set_snap(100.0, SnapAlignment::Start)
        .expect("valid snap interval");

    harness.pointer(PointerPhase::Down, 400.0);
    harness.pointer(PointerPhase::Up, 400.0);
    harness.pump_millis(1_000);

    assert_eq!(harness.flings(), vec![(130, -30, 100, 100)]);
    assert_eq!(harness.host.position.get(), 100);
    assert_eq!(harness.controller.phase(), ControllerPhase::Idle);
}

#[test]
fn zero_velocity_snap_mid_fling_uses_the_running_landing() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 0);
    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(2_000.0));
    harness.pump_millis(64);
    let landing = harness.scroller.final_position();
    let position = harness.host.position.get();
    assert!(position < landing, "still travelling at {position} toward {landing}");

    harness
        .controller
        .set_snap(100.0, SnapAlignment::Start)
        .expect("valid snap interval");
    let target = harness.controller.fling_and_snap(0).expect("content present");

    assert_eq!(target.offset, quantize(landing, 0, 100.0, 9_200).offset);
    harness.pump_millis(4_000);
    assert_eq!(harness.host.position.get(), target.offset);
}

#[test]
fn new_gesture_aborts_running_fling() {
    let harness = Harness::new(Some(ContentExtents::new(10_000, 800)), 0);
    harness.pointer(PointerPhase::Down, 400.0);
    harness.controller.on_release(Some(4_000.0));
    harness.pump_millis(64);

    harness.pointer(PointerPhase::Down, 400.0);
    let stopped_at = harness.host.position.get();
    harness.pump_millis(500);

    assert!(harness.scroller.is_finished());
    assert_eq!(harness.host.position.get(), stopped_at);
}

// ----------------------------------------------------------------------
// Host helpers and configuration
// ----------------------------------------------------------------------

#[test]
fn scroll_changes_are_forwarded() {
    let harness = Harness::scrolled(0);
    harness
        .controller
        .set_scroll_listener(Some(harness.listener.clone()));

    harness.controller.dispatch_scroll_changed(10, 4);
    harness.controller.dispatch_scroll_changed(12, 10);

    assert_eq!(*harness.listener.scrolls.borrow(), vec![(10, 4), (12, 10)]);
}

#[test]
fn overscroll_distance_is_zero_at_disabled_edge() {
    let harness = Harness::scrolled(1_200);
    assert_eq!(harness.controller.overscroll_distance(10), 50);

    harness.controller.set_disable_bounce(false, true);
    assert_eq!(harness.controller.overscroll_distance(10), 0);
    assert_eq!(harness.controller.overscroll_distance(-10), 50);
}

#[test]
fn invalid_config_is_rejected_and_previous_kept() {
    let harness = Harness::scrolled(0);
    let before = harness.controller.config();

    let result = harness
        .controller
        .set_config(OverscrollConfig::default().with_damping(0.0, true));
    assert_eq!(result, Err(ConfigError::InvalidDamping { value: 0.0 }));
    assert_eq!(harness.controller.config(), before);

    assert_eq!(
        harness.controller.set_density(-1.0),
        Err(ConfigError::InvalidDensity { value: -1.0 })
    );
    assert_eq!(harness.controller.config(), before);

    harness
        .controller
        .set_config(OverscrollConfig::default().with_damping(2.0, false))
        .expect("valid config");
    assert_eq!(harness.controller.config().damping_coefficient, 2.0);
}

#[test]
fn constant_damping_ignores_stretch() {
    let harness = Harness::scrolled(0);
    harness
        .controller
        .set_damping(2.0, false)
        .expect("valid damping");

    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 200.0);
    harness.pointer(PointerPhase::Move, 300.0);

    assert_eq!(*harness.host.translations.borrow(), vec![50.0, 100.0]);
}

#[test]
fn dropping_controller_cancels_pending_work() {
    let harness = Harness::scrolled(0);
    harness.pointer(PointerPhase::Down, 100.0);
    harness.pointer(PointerPhase::Move, 200.0);
    harness.pointer(PointerPhase::Up, 200.0);

    let Harness {
        runtime,
        host,
        controller,
        ..
    } = harness;
    let writes = host.translations.borrow().len();
    drop(controller);

    let handle = runtime.handle();
    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(2 * FRAME_NANOS);
    assert_eq!(host.translations.borrow().len(), writes);
}
