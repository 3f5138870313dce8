//! Single-threaded run loop for the elastic overscroll controller.
//!
//! The host pumps [`RuntimeHandle::drain_frame_callbacks`] once per frame.
//! Animation frames and delayed polls are both delivered from that call, so
//! every state transition happens on the host's event thread.

mod frame_clock;
mod platform;
mod runtime;

pub use frame_clock::{FrameClock, FrameCallbackRegistration};
pub use platform::{DefaultScheduler, RuntimeScheduler};
pub use runtime::{Runtime, RuntimeHandle};

pub type FrameCallbackId = u64;

/// Nanoseconds per millisecond, the unit frame timestamps are expressed in.
pub const NANOS_PER_MILLI: u64 = 1_000_000;
