//! Elastic single-axis scrolling: rubber-band overscroll at the content
//! edges, an eased bounce-back, and fling snapping onto a fixed grid.
//!
//! The [`OverscrollController`] is composed into a scrolling view; the view
//! implements [`ScrollHost`] and forwards its pointer stream.

pub mod axis_gate;
pub mod bounce;
pub mod config;
pub mod controller;
pub mod damping;
pub mod host;
pub mod momentum;
pub mod settle;
pub mod snap;
pub mod velocity_tracker;

#[cfg(test)]
mod tests;

pub use axis_gate::accepts_axis;
pub use bounce::BounceBackAnimator;
pub use config::{ConfigError, OverscrollConfig, SnapAlignment};
pub use controller::{ControllerPhase, OverscrollController, MIN_FLING_VELOCITY};
pub use damping::EdgePolicy;
pub use host::{
    ContentExtents, Orientation, OverscrollListener, Point, PointerEvent, PointerPhase,
    ScrollChangeListener, ScrollHost,
};
pub use momentum::{DecayMomentumScroller, MomentumScroller};
pub use settle::SettleDetector;
pub use snap::SnapTarget;
pub use velocity_tracker::VelocityTracker1D;

pub mod prelude {
    pub use crate::config::{OverscrollConfig, SnapAlignment};
    pub use crate::controller::{ControllerPhase, OverscrollController};
    pub use crate::host::*;
    pub use crate::momentum::{DecayMomentumScroller, MomentumScroller};
    pub use overscroll_animation::{DecelerationRate, Easing};
}
