//! Rubber-band resistance applied to drag input beyond the content bounds.

/// Baseline stretch added to the overscroll ratio so the very first pixel
/// beyond an edge already meets resistance.
const RATIO_OFFSET: f32 = 0.2;

/// Divisor applied to a raw drag delta while overscrolled.
///
/// With `incremental` set the divisor is `coefficient / (1 - ratio²)`, where
/// `ratio = |overscroll| / viewport + 0.2`, so resistance stiffens without
/// bound as the stretch grows. Once `ratio` reaches 1 the band is rigid and
/// the divisor is infinite. Returns `None` for a non-positive viewport: the
/// ratio is undefined and the caller passes the delta through undamped.
pub fn damping_factor(
    overscroll: f32,
    viewport_extent: f32,
    coefficient: f32,
    incremental: bool,
) -> Option<f32> {
    if viewport_extent <= 0.0 {
        return None;
    }
    if !incremental {
        return Some(coefficient);
    }
    let ratio = overscroll.abs() / viewport_extent + RATIO_OFFSET;
    let stiffness = 1.0 - ratio.powi(2);
    if stiffness <= 0.0 {
        return Some(f32::INFINITY);
    }
    Some(coefficient / stiffness)
}

/// Damped integer delta, truncated toward zero.
pub fn damped_delta(raw_delta: f32, factor: Option<f32>) -> i32 {
    match factor {
        Some(factor) => (raw_delta / factor) as i32,
        None => raw_delta as i32,
    }
}

/// Which edges may stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgePolicy {
    pub disable_start: bool,
    pub disable_end: bool,
}

impl EdgePolicy {
    pub fn new(disable_start: bool, disable_end: bool) -> Self {
        Self {
            disable_start,
            disable_end,
        }
    }

    /// A start-directed (negative) delta stretches only while resting at 0;
    /// anything else stretches only while resting at `max_offset`.
    pub fn accepts(&self, delta: i32, position: i32, max_offset: i32) -> bool {
        if delta < 0 {
            position == 0 && !self.disable_start
        } else {
            position == max_offset && !self.disable_end
        }
    }

    /// Native overscroll range the host may allow for a move of `delta`.
    /// Zero at a disabled edge, which makes that edge hard-clamped.
    pub fn overscroll_distance(
        &self,
        delta: i32,
        position: i32,
        max_offset: i32,
        max_distance: i32,
    ) -> i32 {
        if delta < 0 && position == 0 && self.disable_start {
            0
        } else if delta > 0 && position == max_offset && self.disable_end {
            0
        } else {
            max_distance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistance_stiffens_with_stretch() {
        let viewport = 800.0;
        let mut previous_factor = 0.0;
        let mut previous_delta = i32::MAX;
        for overscroll in (0..600).step_by(25) {
            let factor = damping_factor(overscroll as f32, viewport, 4.0, true)
                .expect("viewport is positive");
            assert!(factor > previous_factor, "factor must grow at {overscroll}");
            let delta = damped_delta(60.0, Some(factor));
            assert!(delta <= previous_delta, "damped delta must not grow at {overscroll}");
            previous_factor = factor;
            previous_delta = delta;
        }
    }

    #[test]
    fn factor_at_rest_uses_baseline_ratio() {
        let factor = damping_factor(0.0, 1000.0, 4.0, true).expect("positive viewport");
        assert!((factor - 4.0 / 0.96).abs() < 1e-5);
    }

    #[test]
    fn constant_resistance_without_incremental() {
        assert_eq!(damping_factor(0.0, 500.0, 4.0, false), Some(4.0));
        assert_eq!(damping_factor(350.0, 500.0, 4.0, false), Some(4.0));
        assert_eq!(damped_delta(-21.0, Some(4.0)), -5);
    }

    #[test]
    fn rigid_band_stops_movement() {
        let factor = damping_factor(900.0, 1000.0, 4.0, true);
        assert_eq!(factor, Some(f32::INFINITY));
        assert_eq!(damped_delta(500.0, factor), 0);
    }

    #[test]
    fn zero_viewport_passes_delta_through() {
        let factor = damping_factor(10.0, 0.0, 4.0, true);
        assert_eq!(factor, None);
        assert_eq!(damped_delta(-17.6, factor), -17);
    }

    #[test]
    fn edges_gate_by_direction_and_position() {
        let policy = EdgePolicy::default();
        assert!(policy.accepts(-3, 0, 500));
        assert!(!policy.accepts(-3, 20, 500));
        assert!(policy.accepts(3, 500, 500));
        assert!(!policy.accepts(3, 0, 500));
    }

    #[test]
    fn disabled_start_edge_rejects_start_delta() {
        let policy = EdgePolicy::new(true, false);
        assert!(!policy.accepts(-8, 0, 500));
        assert!(policy.accepts(8, 500, 500));
        assert_eq!(policy.overscroll_distance(-8, 0, 500, 50), 0);
        assert_eq!(policy.overscroll_distance(8, 500, 500, 50), 50);
    }

    #[test]
    fn disabled_end_edge_is_hard_clamped() {
        let policy = EdgePolicy::new(false, true);
        assert!(!policy.accepts(8, 500, 500));
        assert_eq!(policy.overscroll_distance(8, 500, 500, 50), 0);
        assert_eq!(policy.overscroll_distance(-8, 0, 500, 50), 50);
    }
}
