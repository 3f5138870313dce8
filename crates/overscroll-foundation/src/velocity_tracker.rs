//! Release-velocity estimation from pointer samples.
//!
//! Impulse strategy: each segment between two samples transfers kinetic
//! energy to an imaginary unit mass, and the release velocity is the one
//! that mass ends up with.

use smallvec::SmallVec;

const HISTORY_SIZE: usize = 20;

/// Samples older than this, relative to the newest, are ignored.
const HORIZON_MS: i64 = 100;

/// A gap this long between consecutive samples means the pointer rested.
pub const ASSUME_STOPPED_MS: i64 = 40;

#[derive(Debug, Clone, Copy)]
struct Sample {
    time_ms: i64,
    position: f32,
}

/// Tracks absolute positions along one axis and reports their velocity in
/// units per second.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker1D {
    samples: SmallVec<[Sample; HISTORY_SIZE]>,
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_position(&mut self, time_ms: i64, position: f32) {
        if self.samples.len() == HISTORY_SIZE {
            self.samples.remove(0);
        }
        self.samples.push(Sample { time_ms, position });
    }

    /// Velocity in units per second; 0 with fewer than two usable samples.
    pub fn velocity(&self) -> f32 {
        let Some(newest) = self.samples.last().copied() else {
            return 0.0;
        };

        // Walk back from the newest sample until the horizon or a rest gap.
        let mut first = self.samples.len() - 1;
        while first > 0 {
            let candidate = self.samples[first - 1];
            let newer = self.samples[first];
            if newest.time_ms - candidate.time_ms > HORIZON_MS
                || newer.time_ms - candidate.time_ms > ASSUME_STOPPED_MS
            {
                break;
            }
            first -= 1;
        }

        let window = &self.samples[first..];
        if window.len() < 2 {
            return 0.0;
        }

        let mut work = 0.0f32;
        for (segment, pair) in window.windows(2).enumerate() {
            let elapsed = (pair[1].time_ms - pair[0].time_ms) as f32;
            if elapsed == 0.0 {
                continue;
            }
            let v_curr = (pair[1].position - pair[0].position) / elapsed;
            let v_prev = kinetic_energy_to_velocity(work);
            work += (v_curr - v_prev) * v_curr.abs();
            if segment == 0 {
                work *= 0.5;
            }
        }

        kinetic_energy_to_velocity(work) * 1000.0
    }

    /// [`velocity`](Self::velocity) clamped to `±max_velocity`.
    pub fn velocity_with_max(&self, max_velocity: f32) -> f32 {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return 0.0;
        }
        let velocity = self.velocity();
        if !velocity.is_finite() {
            return 0.0;
        }
        velocity.clamp(-max_velocity, max_velocity)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// `E = ½·v²` for a unit mass, solved for a signed `v`.
fn kinetic_energy_to_velocity(kinetic_energy: f32) -> f32 {
    kinetic_energy.signum() * (2.0 * kinetic_energy.abs()).sqrt()
}
