//! Fling physics and landing prediction.
//!
//! Spline-based deceleration matching Android's `OverScroller`, so a
//! predicted landing point agrees with what a native momentum scroll reaches.

use std::sync::LazyLock;

// ============================================================================
// Android Fling Spline
// ============================================================================

/// Tension curve inflection point
const INFLECTION: f32 = 0.35;
const START_TENSION: f32 = 0.5;
const END_TENSION: f32 = 1.0;
const P1: f32 = START_TENSION * INFLECTION;
const P2: f32 = 1.0 - END_TENSION * (1.0 - INFLECTION);

/// Number of samples in the spline lookup table
const NB_SAMPLES: usize = 100;

/// Distance fraction covered at each of the `NB_SAMPLES + 1` evenly spaced times.
static SPLINE_POSITIONS: LazyLock<[f32; NB_SAMPLES + 1]> = LazyLock::new(|| {
    let mut positions = [0.0f32; NB_SAMPLES + 1];
    let mut x_min = 0.0f32;

    for (i, position) in positions.iter_mut().enumerate().take(NB_SAMPLES) {
        let alpha = i as f32 / NB_SAMPLES as f32;

        // Bisect for x such that bezier(x) = alpha
        let mut x_max = 1.0f32;
        let (x, coef) = loop {
            let x_mid = x_min + (x_max - x_min) / 2.0;
            let c = 3.0 * x_mid * (1.0 - x_mid);
            let tx = c * ((1.0 - x_mid) * P1 + x_mid * P2) + x_mid * x_mid * x_mid;
            if (tx - alpha).abs() < 1e-5 {
                break (x_mid, c);
            }
            if tx > alpha {
                x_max = x_mid;
            } else {
                x_min = x_mid;
            }
        };
        *position = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
    }

    positions[NB_SAMPLES] = 1.0;
    positions
});

/// Android fling spline implementation.
pub struct AndroidFlingSpline;

impl AndroidFlingSpline {
    /// Fraction of the total distance covered at normalized time `time` (0.0 to 1.0).
    pub fn fling_position(time: f32) -> f32 {
        let clamped_time = time.clamp(0.0, 1.0);
        let index = (NB_SAMPLES as f32 * clamped_time) as usize;
        if index >= NB_SAMPLES {
            return 1.0;
        }

        let t_inf = index as f32 / NB_SAMPLES as f32;
        let t_sup = (index + 1) as f32 / NB_SAMPLES as f32;
        let d_inf = SPLINE_POSITIONS[index];
        let d_sup = SPLINE_POSITIONS[index + 1];
        let slope = (d_sup - d_inf) / (t_sup - t_inf);
        d_inf + (clamped_time - t_inf) * slope
    }

    /// Compute deceleration rate for a given velocity and friction.
    pub fn deceleration(velocity: f32, friction: f32) -> f64 {
        (INFLECTION as f64 * velocity.abs() as f64 / friction as f64).ln()
    }
}

// ============================================================================
// Deceleration rate
// ============================================================================

/// Friction preset for momentum scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecelerationRate {
    /// Low friction: a fling of the same velocity travels farther.
    Fast,
    #[default]
    Normal,
}

impl DecelerationRate {
    /// Scroll friction coefficient for this preset.
    pub fn friction(self) -> f32 {
        match self {
            DecelerationRate::Fast => 0.005,
            DecelerationRate::Normal => FlingCalculator::DEFAULT_FRICTION,
        }
    }
}

// ============================================================================
// Fling Calculator
// ============================================================================

/// Earth's gravity in SI units (m/s²)
const GRAVITY_EARTH: f32 = 9.80665;
/// Inches per meter (for density conversion)
const INCHES_PER_METER: f32 = 39.37;
/// Deceleration rate constant (from Android Scroller)
const DECELERATION_RATE: f32 = 2.358_201_6; // (ln(0.78) / ln(0.9)).abs()

/// Computes physical deceleration based on density and friction.
fn compute_deceleration(friction: f32, density: f32) -> f32 {
    GRAVITY_EARTH * INCHES_PER_METER * density * 160.0 * friction
}

/// Calculator for Android-feel fling animations.
#[derive(Debug, Clone, Copy)]
pub struct FlingCalculator {
    friction: f32,
    magic_physical_coefficient: f32,
}

impl FlingCalculator {
    /// Default friction value (matches Android default)
    pub const DEFAULT_FRICTION: f32 = 0.015;

    /// * `friction` - Scroll friction coefficient (higher = faster deceleration)
    /// * `density` - Screen density (e.g., 1.0 for mdpi, 2.0 for xhdpi)
    pub fn new(friction: f32, density: f32) -> Self {
        Self {
            friction,
            magic_physical_coefficient: compute_deceleration(0.84, density),
        }
    }

    pub fn with_rate(rate: DecelerationRate, density: f32) -> Self {
        Self::new(rate.friction(), density)
    }

    fn spline_deceleration(&self, velocity: f32) -> f64 {
        AndroidFlingSpline::deceleration(velocity, self.friction * self.magic_physical_coefficient)
    }

    /// Compute the duration of a fling in milliseconds.
    pub fn fling_duration(&self, velocity: f32) -> i64 {
        if velocity == 0.0 {
            return 0;
        }
        let l = self.spline_deceleration(velocity);
        let decel_minus_one = DECELERATION_RATE as f64 - 1.0;
        (1000.0 * (l / decel_minus_one).exp()) as i64
    }

    /// Compute the total distance a fling will travel.
    pub fn fling_distance(&self, velocity: f32) -> f32 {
        if velocity == 0.0 {
            return 0.0;
        }
        let l = self.spline_deceleration(velocity);
        let decel_minus_one = DECELERATION_RATE as f64 - 1.0;
        self.friction
            * self.magic_physical_coefficient
            * (DECELERATION_RATE as f64 / decel_minus_one * l).exp() as f32
    }
}

// ============================================================================
// Landing prediction
// ============================================================================

/// Resting offset an unassisted fling from `start` would reach.
///
/// The decay runs with the friction of `rate` and the result is clamped to
/// `[min, max]`, mirroring a bounded momentum scroll. Zero velocity returns
/// `start` untouched. Pure: nothing is animated or mutated.
pub fn predict_fling_target(
    start: i32,
    velocity: i32,
    rate: DecelerationRate,
    min: i32,
    max: i32,
    density: f32,
) -> i32 {
    if velocity == 0 {
        return start;
    }
    let calculator = FlingCalculator::with_rate(rate, density);
    let velocity = velocity as f32;
    let landing = start as f32 + calculator.fling_distance(velocity) * velocity.signum();
    (landing.round() as i32).clamp(min, max.max(min))
}
