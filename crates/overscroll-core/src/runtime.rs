use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;
use crate::FrameCallbackId;

type FrameCallback = Box<dyn FnOnce(u64) + 'static>;
type DelayedCallback = Box<dyn FnOnce() + 'static>;

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<FrameCallback>,
}

struct DelayedCallbackEntry {
    id: FrameCallbackId,
    due_nanos: u64,
    callback: Option<DelayedCallback>,
}

struct RuntimeInner {
    scheduler: Rc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    delayed_callbacks: RefCell<Vec<DelayedCallbackEntry>>,
    next_callback_id: Cell<u64>,
    /// Timestamp of the most recent drained frame.
    now_nanos: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Rc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            frame_callbacks: RefCell::new(VecDeque::new()),
            delayed_callbacks: RefCell::new(Vec::new()),
            next_callback_id: Cell::new(1),
            now_nanos: Cell::new(0),
        }
    }

    fn next_id(&self) -> FrameCallbackId {
        let id = self.next_callback_id.get();
        self.next_callback_id.set(id + 1);
        id
    }

    fn schedule(&self) {
        if !self.needs_frame.replace(true) {
            self.scheduler.schedule_frame();
        }
    }

    fn has_pending_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty() || !self.delayed_callbacks.borrow().is_empty()
    }

    fn register_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.next_id();
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn register_delayed_callback(
        &self,
        delay_nanos: u64,
        callback: DelayedCallback,
    ) -> FrameCallbackId {
        let id = self.next_id();
        let due_nanos = self.now_nanos.get().saturating_add(delay_nanos);
        self.delayed_callbacks
            .borrow_mut()
            .push(DelayedCallbackEntry {
                id,
                due_nanos,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_callback(&self, id: FrameCallbackId) {
        {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
                callbacks.remove(index);
            }
        }
        {
            let mut delayed = self.delayed_callbacks.borrow_mut();
            if let Some(index) = delayed.iter().position(|entry| entry.id == id) {
                delayed.remove(index);
            }
        }
        if !self.has_pending_callbacks() {
            self.needs_frame.set(false);
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        let now = self.now_nanos.get().max(frame_time_nanos);
        self.now_nanos.set(now);
        self.needs_frame.set(false);

        // Collect first so callbacks may register follow-ups for the next frame.
        let mut frame_pending: SmallVec<[FrameCallback; 8]> = SmallVec::new();
        {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            while let Some(mut entry) = callbacks.pop_front() {
                if let Some(callback) = entry.callback.take() {
                    frame_pending.push(callback);
                }
            }
        }

        let mut due: SmallVec<[DelayedCallbackEntry; 4]> = SmallVec::new();
        {
            let mut delayed = self.delayed_callbacks.borrow_mut();
            let mut index = 0;
            while index < delayed.len() {
                if delayed[index].due_nanos <= now {
                    due.push(delayed.remove(index));
                } else {
                    index += 1;
                }
            }
        }
        due.sort_by_key(|entry| (entry.due_nanos, entry.id));

        if !frame_pending.is_empty() || !due.is_empty() {
            log::trace!(
                "frame {now}: {} frame callbacks, {} delayed callbacks",
                frame_pending.len(),
                due.len()
            );
        }

        for callback in frame_pending {
            callback(now);
        }
        for mut entry in due {
            if let Some(callback) = entry.callback.take() {
                callback();
            }
        }

        // Follow-ups and not-yet-due delays need another frame.
        if self.has_pending_callbacks() {
            self.schedule();
        }
    }
}

/// Owner of the run loop state. Dropping it invalidates every handle.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Rc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Weak handle to a [`Runtime`], cheap to clone into callbacks.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    /// Registers `callback` to run on the first frame at least `delay_nanos`
    /// after the most recently drained frame.
    pub fn register_delayed_callback(
        &self,
        delay_nanos: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_delayed_callback(delay_nanos, Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub fn now_nanos(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.now_nanos.get())
            .unwrap_or(0)
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn has_pending_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_callbacks())
            .unwrap_or(false)
    }
}
