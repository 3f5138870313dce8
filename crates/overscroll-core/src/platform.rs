//! Platform abstraction traits for the overscroll runtime.
//!
//! The host owns the real run loop. The runtime only asks it for a frame.

/// Schedules work for the runtime.
///
/// Implementations are responsible for triggering frame processing on the
/// host's UI thread.
pub trait RuntimeScheduler {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Scheduler for hosts that pump frames unconditionally (tests, fixed-rate loops).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}
