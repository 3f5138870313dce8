//! Single-axis dominance check run before any drag processing.

use crate::host::{Orientation, PointerEvent};

/// Whether `event` moved further along `orientation` than across it since its
/// historical sample.
///
/// Ties (a 45° path) are rejected. An event without historical data is
/// accepted as same-axis motion rather than dropping the gesture.
pub fn accepts_axis(event: &PointerEvent, orientation: Orientation) -> bool {
    let Some(historical) = event.historical else {
        return true;
    };
    let main = (orientation.main_axis(event.position) - orientation.main_axis(historical)).abs();
    let cross =
        (orientation.cross_axis(event.position) - orientation.cross_axis(historical)).abs();
    main > cross
}
