//! Single-axis elastic scroll controller.
//!
//! [`OverscrollController`] sits between a scrolling view and its pointer
//! stream. While the content rests on an edge, drags past that edge become a
//! damped visual translation instead of a scroll; on release the translation
//! eases back to zero. Flings optionally land on a snap grid, and a polling
//! settle detector snaps content that came to rest off-grid.
//!
//! Geometry is always read back from the [`ScrollHost`]; the controller keeps
//! only gesture state of its own.

use std::cell::RefCell;
use std::rc::Rc;

use overscroll_animation::{predict_fling_target, AnimationSpec, DecelerationRate, Easing};
use overscroll_core::{RuntimeHandle, NANOS_PER_MILLI};
use web_time::Duration;

use crate::axis_gate::accepts_axis;
use crate::bounce::{overscroll_report, BounceBackAnimator};
use crate::config::{ConfigError, OverscrollConfig, SnapAlignment};
use crate::damping::{damped_delta, damping_factor, EdgePolicy};
use crate::host::{
    Orientation, OverscrollListener, PointerEvent, PointerPhase, ScrollChangeListener, ScrollHost,
};
use crate::momentum::MomentumScroller;
use crate::settle::SettleDetector;
use crate::snap::{quantize, SnapTarget};
use crate::velocity_tracker::VelocityTracker1D;

/// Release speed, in px/s, below which no fling is started.
pub const MIN_FLING_VELOCITY: f32 = 50.0;

/// Upper bound for a tracked release speed, in dp/s.
pub const MAX_FLING_VELOCITY: f32 = 8_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPhase {
    #[default]
    Idle,
    Dragging,
    Flinging,
    /// Released without momentum; the bounce-back and settle detection run.
    SnappingBack,
}

struct ScrollAxisState {
    config: OverscrollConfig,
    phase: ControllerPhase,
    overscroll: f32,
    drag_anchor: Option<f32>,
    snapped_this_gesture: bool,
    velocity: VelocityTracker1D,
}

struct ControllerInner {
    orientation: Orientation,
    runtime: RuntimeHandle,
    host: Rc<dyn ScrollHost>,
    scroller: Rc<dyn MomentumScroller>,
    bounce: BounceBackAnimator,
    settle: SettleDetector,
    state: RefCell<ScrollAxisState>,
    overscroll_listener: RefCell<Option<Rc<dyn OverscrollListener>>>,
    scroll_listener: RefCell<Option<Rc<dyn ScrollChangeListener>>>,
}

/// Rubber-band overscroll, fling snapping and settle detection for one axis.
///
/// Cloning yields another handle to the same controller. Pending animations
/// and polls hold weak references only, so dropping the last handle stops
/// everything.
#[derive(Clone)]
pub struct OverscrollController {
    inner: Rc<ControllerInner>,
}

impl OverscrollController {
    pub fn new(
        orientation: Orientation,
        runtime: RuntimeHandle,
        host: Rc<dyn ScrollHost>,
        scroller: Rc<dyn MomentumScroller>,
    ) -> Self {
        let config = OverscrollConfig::default();
        scroller.set_friction(config.deceleration_rate, config.density);
        Self {
            inner: Rc::new(ControllerInner {
                orientation,
                bounce: BounceBackAnimator::new(runtime.clone()),
                settle: SettleDetector::new(runtime.clone()),
                runtime,
                host,
                scroller,
                state: RefCell::new(ScrollAxisState {
                    config,
                    phase: ControllerPhase::Idle,
                    overscroll: 0.0,
                    drag_anchor: None,
                    snapped_this_gesture: false,
                    velocity: VelocityTracker1D::new(),
                }),
                overscroll_listener: RefCell::new(None),
                scroll_listener: RefCell::new(None),
            }),
        }
    }

    /// Like [`new`](Self::new), starting from `config` instead of the defaults.
    pub fn with_config(
        orientation: Orientation,
        runtime: RuntimeHandle,
        host: Rc<dyn ScrollHost>,
        scroller: Rc<dyn MomentumScroller>,
        config: OverscrollConfig,
    ) -> Result<Self, ConfigError> {
        let controller = Self::new(orientation, runtime, host, scroller);
        controller.set_config(config)?;
        Ok(controller)
    }

    pub fn orientation(&self) -> Orientation {
        self.inner.orientation
    }

    pub fn phase(&self) -> ControllerPhase {
        self.inner.state.borrow().phase
    }

    /// Current signed overscroll; negative past the start edge.
    pub fn overscroll_translation(&self) -> f32 {
        self.inner.state.borrow().overscroll
    }

    pub fn config(&self) -> OverscrollConfig {
        self.inner.state.borrow().config.clone()
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Feeds one pointer event to the controller.
    ///
    /// Returns whether the event moved mostly along this controller's axis.
    /// Off-axis moves are not processed so an enclosing scroller of the other
    /// orientation can take them. Down, Up and Cancel are always processed.
    pub fn on_pointer_event(&self, event: &PointerEvent) -> bool {
        let accepted = accepts_axis(event, self.inner.orientation);
        let coordinate = self.inner.orientation.main_axis(event.position);
        let time_ms = event
            .uptime_millis
            .unwrap_or_else(|| (self.inner.runtime.now_nanos() / NANOS_PER_MILLI) as i64);

        match event.phase {
            PointerPhase::Down => self.begin_drag(coordinate, time_ms),
            PointerPhase::Move => {
                if !accepted {
                    log::trace!("{:?}: off-axis move ignored", self.inner.orientation);
                    let mut state = self.inner.state.borrow_mut();
                    if let Some(anchor) = state.drag_anchor.as_mut() {
                        *anchor = coordinate;
                    }
                    state.velocity.add_position(time_ms, coordinate);
                    return false;
                }
                self.drag_to(coordinate, time_ms);
            }
            PointerPhase::Up => {
                self.inner
                    .state
                    .borrow_mut()
                    .velocity
                    .add_position(time_ms, coordinate);
                self.release(None, true);
            }
            PointerPhase::Cancel => self.release(None, false),
        }
        accepted
    }

    /// Ends the gesture with a host-measured scroll velocity in px/s.
    ///
    /// Positive velocities scroll toward larger offsets. `None` uses the
    /// velocity tracked from the pointer stream.
    pub fn on_release(&self, velocity: Option<f32>) {
        self.release(velocity, true);
    }

    fn begin_drag(&self, coordinate: f32, time_ms: i64) {
        self.inner.bounce.cancel();
        self.inner.scroller.abort();
        self.inner.settle.disarm();

        let overscroll = {
            let mut state = self.inner.state.borrow_mut();
            state.drag_anchor = Some(coordinate);
            state.snapped_this_gesture = false;
            state.velocity.reset();
            state.velocity.add_position(time_ms, coordinate);
            state.overscroll
        };
        log::trace!("drag starts at {coordinate} with overscroll {overscroll}");
        self.set_phase(ControllerPhase::Dragging);
    }

    fn drag_to(&self, coordinate: f32, time_ms: i64) {
        let (raw_delta, overscroll, coefficient, incremental, edges) = {
            let mut state = self.inner.state.borrow_mut();
            state.velocity.add_position(time_ms, coordinate);
            let Some(anchor) = state.drag_anchor.replace(coordinate) else {
                return;
            };
            (
                anchor - coordinate,
                state.overscroll,
                state.config.damping_coefficient,
                state.config.incremental_damping,
                EdgePolicy::new(
                    state.config.disable_bounce_at_start,
                    state.config.disable_bounce_at_end,
                ),
            )
        };

        let Some(extents) = self.inner.host.extents() else {
            return;
        };
        let factor = damping_factor(overscroll, extents.viewport as f32, coefficient, incremental);
        let delta = damped_delta(raw_delta, factor);
        let position = self.inner.host.scroll_position();
        if !edges.accepts(delta, position, extents.max_offset()) {
            return;
        }

        let overscroll = {
            let mut state = self.inner.state.borrow_mut();
            state.overscroll += delta as f32;
            state.overscroll
        };
        log::trace!("raw {raw_delta} damped to {delta}, overscroll now {overscroll}");
        self.apply_translation(overscroll);
    }

    fn release(&self, velocity: Option<f32>, allow_fling: bool) {
        let (overscroll, tracked, spec) = {
            let mut state = self.inner.state.borrow_mut();
            state.drag_anchor = None;
            let max_velocity = MAX_FLING_VELOCITY * state.config.density;
            // Pointer motion toward larger coordinates scrolls toward the start.
            let tracked = -state.velocity.velocity_with_max(max_velocity);
            state.velocity.reset();
            (state.overscroll, tracked, state.config.bounce_spec())
        };

        if overscroll != 0.0 {
            self.start_bounce_back(overscroll, spec);
        }
        self.arm_settle();

        let velocity = velocity.unwrap_or(tracked);
        let flung = allow_fling
            && velocity.abs() >= MIN_FLING_VELOCITY
            && self.launch_fling(velocity as i32);
        self.set_phase(if flung {
            ControllerPhase::Flinging
        } else {
            ControllerPhase::SnappingBack
        });
    }

    // ------------------------------------------------------------------
    // Momentum
    // ------------------------------------------------------------------

    /// Starts a momentum scroll, snapped to the grid when snapping is on.
    pub fn fling(&self, velocity: i32) {
        if self.launch_fling(velocity) {
            self.set_phase(ControllerPhase::Flinging);
        }
    }

    /// Flings so the scroll comes to rest on a snap line.
    ///
    /// Returns the chosen landing, or `None` when snapping is disabled or
    /// there is no content.
    pub fn fling_and_snap(&self, velocity: i32) -> Option<SnapTarget> {
        let target = self.snap(velocity)?;
        self.set_phase(ControllerPhase::Flinging);
        Some(target)
    }

    fn launch_fling(&self, velocity: i32) -> bool {
        if self.inner.state.borrow().config.snapping_enabled() {
            return self.snap(velocity).is_some();
        }
        let Some(extents) = self.inner.host.extents() else {
            return false;
        };
        let position = self.inner.host.scroll_position();
        let max_offset = extents.max_offset();
        log::debug!("fling from {position} at {velocity}px/s within [0, {max_offset}]");
        self.inner.scroller.fling(position, velocity, 0, max_offset);
        true
    }

    fn snap(&self, velocity: i32) -> Option<SnapTarget> {
        let (interval, rate, density) = {
            let state = self.inner.state.borrow();
            (
                state.config.scaled_snap_interval(),
                state.config.deceleration_rate,
                state.config.density,
            )
        };
        if interval <= 0.0 {
            return None;
        }
        let extents = self.inner.host.extents()?;
        let max_offset = extents.max_offset();
        let position = self.inner.host.scroll_position();

        // Without new momentum, a fling still in flight decides where content rests.
        let predicted = if velocity == 0 && !self.inner.scroller.is_finished() {
            self.inner.scroller.final_position().clamp(0, max_offset)
        } else {
            predict_fling_target(position, velocity, rate, 0, max_offset, density)
        };
        let target = quantize(predicted, velocity, interval, max_offset);
        let launch_velocity = if target.velocity != 0 {
            target.velocity
        } else {
            target.offset - position
        };
        log::debug!(
            "snap from {position}: predicted {predicted}, landing {} (v={velocity} -> {launch_velocity})",
            target.offset
        );

        self.inner
            .scroller
            .fling(position, launch_velocity, target.offset, target.offset);
        self.inner.state.borrow_mut().snapped_this_gesture = true;
        Some(target)
    }

    // ------------------------------------------------------------------
    // Bounce-back and settling
    // ------------------------------------------------------------------

    fn start_bounce_back(&self, from: f32, spec: AnimationSpec) {
        let on_frame = Rc::downgrade(&self.inner);
        let on_end = on_frame.clone();
        self.inner.bounce.start(
            from,
            spec,
            move |value| {
                if let Some(inner) = on_frame.upgrade() {
                    OverscrollController { inner }.on_bounce_frame(value);
                }
            },
            move || {
                if let Some(inner) = on_end.upgrade() {
                    OverscrollController { inner }.on_bounce_finished();
                }
            },
        );
    }

    fn on_bounce_frame(&self, value: f32) {
        self.inner.state.borrow_mut().overscroll = value;
        self.apply_translation(value);
    }

    fn on_bounce_finished(&self) {
        self.inner.state.borrow_mut().overscroll = 0.0;
        log::trace!("bounce-back finished");
        self.arm_settle();
    }

    fn arm_settle(&self) {
        let interval = self.inner.state.borrow().config.settle_poll_interval;
        let host = Rc::clone(&self.inner.host);
        let weak = Rc::downgrade(&self.inner);
        self.inner.settle.arm(
            interval,
            move || host.scroll_position(),
            move || {
                if let Some(inner) = weak.upgrade() {
                    OverscrollController { inner }.on_settled();
                }
            },
        );
    }

    fn on_settled(&self) {
        let (phase, snap_pending) = {
            let state = self.inner.state.borrow();
            (
                state.phase,
                state.config.snapping_enabled() && !state.snapped_this_gesture,
            )
        };
        if phase == ControllerPhase::Dragging {
            return;
        }

        if snap_pending && self.snap(0).is_some() {
            log::debug!(
                "settled off-grid at {}, snapping",
                self.inner.host.scroll_position()
            );
            self.set_phase(ControllerPhase::Flinging);
            self.arm_settle();
            return;
        }

        if !self.inner.scroller.is_finished() {
            // Sub-pixel tail of a fling; keep watching.
            self.arm_settle();
        } else if !self.inner.bounce.is_running() {
            self.set_phase(ControllerPhase::Idle);
        }
    }

    // ------------------------------------------------------------------
    // Host-facing helpers
    // ------------------------------------------------------------------

    /// Forwards a scroll-position change to the scroll listener.
    pub fn dispatch_scroll_changed(&self, new_position: i32, old_position: i32) {
        let listener = self.inner.scroll_listener.borrow().clone();
        if let Some(listener) = listener {
            listener.on_scroll_changed(new_position, old_position);
        }
    }

    /// Native overscroll range the host should allow for a scroll of `delta`.
    pub fn overscroll_distance(&self, delta: i32) -> i32 {
        let Some(extents) = self.inner.host.extents() else {
            return 0;
        };
        let (edges, max_distance) = {
            let state = self.inner.state.borrow();
            (
                EdgePolicy::new(
                    state.config.disable_bounce_at_start,
                    state.config.disable_bounce_at_end,
                ),
                state.config.scaled_max_overscroll_distance(),
            )
        };
        edges.overscroll_distance(
            delta,
            self.inner.host.scroll_position(),
            extents.max_offset(),
            max_distance,
        )
    }

    pub fn set_overscroll_listener(&self, listener: Option<Rc<dyn OverscrollListener>>) {
        *self.inner.overscroll_listener.borrow_mut() = listener;
    }

    pub fn set_scroll_listener(&self, listener: Option<Rc<dyn ScrollChangeListener>>) {
        *self.inner.scroll_listener.borrow_mut() = listener;
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Replaces the whole configuration. An invalid one is rejected and the
    /// current configuration stays in effect.
    pub fn set_config(&self, config: OverscrollConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.inner
            .scroller
            .set_friction(config.deceleration_rate, config.density);
        self.inner.state.borrow_mut().config = config;
        Ok(())
    }

    /// Edits a copy of the configuration and applies it via [`set_config`](Self::set_config).
    pub fn update_config<F>(&self, edit: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut OverscrollConfig),
    {
        let mut config = self.config();
        edit(&mut config);
        self.set_config(config)
    }

    pub fn set_damping(&self, coefficient: f32, incremental: bool) -> Result<(), ConfigError> {
        self.update_config(|config| {
            config.damping_coefficient = coefficient;
            config.incremental_damping = incremental;
        })
    }

    pub fn set_snap(&self, interval: f32, alignment: SnapAlignment) -> Result<(), ConfigError> {
        self.update_config(|config| {
            config.snap_interval = interval;
            config.snap_alignment = alignment;
        })
    }

    pub fn set_density(&self, density: f32) -> Result<(), ConfigError> {
        self.update_config(|config| config.density = density)
    }

    pub fn set_max_overscroll_distance(&self, distance: f32) -> Result<(), ConfigError> {
        self.update_config(|config| config.max_overscroll_distance = distance)
    }

    pub fn set_settle_poll_interval(&self, interval: Duration) -> Result<(), ConfigError> {
        self.update_config(|config| config.settle_poll_interval = interval)
    }

    pub fn set_bounce(&self, duration: Duration, easing: Easing) {
        let mut state = self.inner.state.borrow_mut();
        state.config.bounce_duration = duration;
        state.config.bounce_easing = easing;
    }

    pub fn set_disable_bounce(&self, at_start: bool, at_end: bool) {
        let mut state = self.inner.state.borrow_mut();
        state.config.disable_bounce_at_start = at_start;
        state.config.disable_bounce_at_end = at_end;
    }

    pub fn set_deceleration_rate(&self, rate: DecelerationRate) {
        let density = {
            let mut state = self.inner.state.borrow_mut();
            state.config.deceleration_rate = rate;
            state.config.density
        };
        self.inner.scroller.set_friction(rate, density);
    }

    // ------------------------------------------------------------------

    fn apply_translation(&self, overscroll: f32) {
        self.inner.host.set_content_translation(-overscroll);
        let listener = self.inner.overscroll_listener.borrow().clone();
        if let Some(listener) = listener {
            let (toward_start, magnitude) = overscroll_report(overscroll);
            listener.on_overscrolling(toward_start, magnitude);
        }
    }

    fn set_phase(&self, phase: ControllerPhase) {
        let previous = std::mem::replace(&mut self.inner.state.borrow_mut().phase, phase);
        if previous != phase {
            log::debug!(
                "{:?} controller: {:?} -> {:?}",
                self.inner.orientation,
                previous,
                phase
            );
        }
    }
}
