//! Quantization of fling landing points onto a fixed grid.

/// Velocity boost per pixel of remaining distance to the chosen grid line.
pub const OVERSHOOT_CORRECTION: f64 = 10.0;

/// Committed snap destination and the velocity to launch toward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapTarget {
    pub offset: i32,
    pub velocity: i32,
}

/// Picks the grid line a fling predicted to land at `predicted` should settle on.
///
/// Positive velocity commits to the next line at or after the prediction and
/// negative velocity to the line at or before it; both adjust the velocity by
/// [`OVERSHOOT_CORRECTION`] times the gap. Zero velocity picks the nearest line
/// and leaves velocity alone. The result is clamped to `[0, max_offset]`. A
/// non-positive `interval` disables the grid and only clamps.
pub fn quantize(predicted: i32, velocity: i32, interval: f32, max_offset: i32) -> SnapTarget {
    let max_offset = max_offset.max(0);
    if interval <= 0.0 {
        return SnapTarget {
            offset: predicted.clamp(0, max_offset),
            velocity,
        };
    }

    let interval = interval as f64;
    let ratio = predicted as f64 / interval;
    let smaller = (ratio.floor() * interval) as i32;
    let larger = (ratio.ceil() * interval) as i32;
    let nearest = ((ratio + 0.5).floor() * interval) as i32;

    let (offset, velocity) = if velocity > 0 {
        let boost = ((larger as f64 - predicted as f64) * OVERSHOOT_CORRECTION) as i32;
        (larger, velocity.saturating_add(boost))
    } else if velocity < 0 {
        let boost = ((predicted as f64 - smaller as f64) * OVERSHOOT_CORRECTION) as i32;
        (smaller, velocity.saturating_sub(boost))
    } else {
        (nearest, velocity)
    };

    SnapTarget {
        offset: offset.clamp(0, max_offset),
        velocity,
    }
}
