//! Polling detector for "the content has stopped moving".
//!
//! The momentum scroller is opaque, so the only way to learn a fling has
//! finished is to sample the scroll position until two samples agree.

use std::cell::RefCell;
use std::rc::Rc;

use overscroll_core::{FrameCallbackRegistration, FrameClock, RuntimeHandle};
use web_time::Duration;

type Sampler = Rc<dyn Fn() -> i32>;

struct PendingPoll {
    generation: u64,
    interval: Duration,
    last_sample: i32,
    sample: Sampler,
    on_stopped: Option<Box<dyn FnOnce()>>,
    registration: Option<FrameCallbackRegistration>,
}

#[derive(Default)]
struct SettleState {
    generation: u64,
    pending: Option<PendingPoll>,
}

/// Samples a position every `interval` and fires once two samples match.
///
/// Arming replaces any pending poll, so overlapping activations collapse to
/// the most recent one and each compares against its own starting sample.
#[derive(Clone)]
pub struct SettleDetector {
    state: Rc<RefCell<SettleState>>,
    frame_clock: FrameClock,
}

impl SettleDetector {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            state: Rc::new(RefCell::new(SettleState::default())),
            frame_clock: runtime.frame_clock(),
        }
    }

    pub fn arm<P, S>(&self, interval: Duration, sample: P, on_stopped: S)
    where
        P: Fn() -> i32 + 'static,
        S: FnOnce() + 'static,
    {
        let sample: Sampler = Rc::new(sample);
        let last_sample = sample();
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            // Dropping the previous poll cancels its timer.
            state.pending = Some(PendingPoll {
                generation: state.generation,
                interval,
                last_sample,
                sample,
                on_stopped: Some(Box::new(on_stopped)),
                registration: None,
            });
            state.generation
        };
        log::trace!("settle detector armed at {last_sample} (generation {generation})");
        schedule_poll(&self.state, &self.frame_clock, generation, interval);
    }

    pub fn disarm(&self) {
        let pending = self.state.borrow_mut().pending.take();
        drop(pending);
    }

    pub fn is_armed(&self) -> bool {
        self.state.borrow().pending.is_some()
    }
}

fn schedule_poll(
    state: &Rc<RefCell<SettleState>>,
    frame_clock: &FrameClock,
    generation: u64,
    interval: Duration,
) {
    let weak = Rc::downgrade(state);
    let clock = frame_clock.clone();
    let registration = frame_clock.with_delay(interval, move || {
        if let Some(state) = weak.upgrade() {
            poll(&state, &clock, generation);
        }
    });
    if let Some(pending) = state.borrow_mut().pending.as_mut() {
        if pending.generation == generation {
            pending.registration = Some(registration);
        }
    }
}

fn poll(state: &Rc<RefCell<SettleState>>, frame_clock: &FrameClock, generation: u64) {
    let (sample, last_sample, interval) = {
        let mut guard = state.borrow_mut();
        let Some(pending) = guard
            .pending
            .as_mut()
            .filter(|pending| pending.generation == generation)
        else {
            return;
        };
        pending.registration = None;
        (pending.sample.clone(), pending.last_sample, pending.interval)
    };

    let current = sample();
    if current == last_sample {
        let on_stopped = {
            let mut guard = state.borrow_mut();
            match guard.pending.take() {
                Some(mut pending) if pending.generation == generation => pending.on_stopped.take(),
                other => {
                    guard.pending = other;
                    None
                }
            }
        };
        log::debug!("scroll settled at {current}");
        if let Some(on_stopped) = on_stopped {
            on_stopped();
        }
    } else {
        if let Some(pending) = state.borrow_mut().pending.as_mut() {
            if pending.generation == generation {
                pending.last_sample = current;
            }
        }
        schedule_poll(state, frame_clock, generation, interval);
    }
}
