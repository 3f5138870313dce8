//! Boundary between the controller and the view that embeds it.
//!
//! The view forwards raw pointer events in and applies the controller's
//! outputs; geometry is read back through [`ScrollHost`] on every use.

/// Scroll axis a controller is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Coordinate of `point` along this axis.
    pub fn main_axis(self, point: Point) -> f32 {
        match self {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    /// Coordinate of `point` along the perpendicular axis.
    pub fn cross_axis(self, point: Point) -> f32 {
        match self {
            Orientation::Horizontal => point.y,
            Orientation::Vertical => point.x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw pointer sample as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    /// Oldest batched sample for this event, if the platform supplied one.
    pub historical: Option<Point>,
    /// Event timestamp; the runtime's frame time is used when absent.
    pub uptime_millis: Option<i64>,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Point) -> Self {
        Self {
            phase,
            position,
            historical: None,
            uptime_millis: None,
        }
    }

    pub fn with_historical(mut self, historical: Point) -> Self {
        self.historical = Some(historical);
        self
    }

    pub fn at_uptime(mut self, uptime_millis: i64) -> Self {
        self.uptime_millis = Some(uptime_millis);
        self
    }
}

/// Child-content geometry along the controller's axis, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentExtents {
    pub content: i32,
    pub viewport: i32,
    pub padding_start: i32,
    pub padding_end: i32,
}

impl ContentExtents {
    pub fn new(content: i32, viewport: i32) -> Self {
        Self {
            content,
            viewport,
            padding_start: 0,
            padding_end: 0,
        }
    }

    pub fn with_padding(mut self, start: i32, end: i32) -> Self {
        self.padding_start = start;
        self.padding_end = end;
        self
    }

    /// Viewport length left for content after padding.
    pub fn inner_viewport(&self) -> i32 {
        (self.viewport - self.padding_start - self.padding_end).max(0)
    }

    /// Largest legal scroll position; never negative.
    pub fn max_offset(&self) -> i32 {
        (self.content - self.inner_viewport()).max(0)
    }
}

/// Capabilities the embedding view exposes to the controller.
pub trait ScrollHost {
    /// Current scroll offset along the controller's axis.
    fn scroll_position(&self) -> i32;

    /// Geometry of the scrolled child, or `None` when there is no child.
    fn extents(&self) -> Option<ContentExtents>;

    /// Visual offset applied to the content, independent of the scroll position.
    fn set_content_translation(&self, translation: f32);
}

pub trait OverscrollListener {
    /// `toward_start` is true when the content is pulled past its start edge.
    fn on_overscrolling(&self, toward_start: bool, magnitude: i32);
}

pub trait ScrollChangeListener {
    fn on_scroll_changed(&self, new_position: i32, old_position: i32);
}
