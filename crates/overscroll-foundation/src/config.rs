//! Tunables for the overscroll controller.
//!
//! Distances are stored in density-independent units and scaled by
//! [`OverscrollConfig::density`] when the controller reads them.

use overscroll_animation::{AnimationSpec, DecelerationRate, Easing};
use web_time::Duration;

/// Resistance coefficient applied to drag deltas beyond the content bounds.
pub const DEFAULT_DAMPING_COEFFICIENT: f32 = 4.0;
/// Time the bounce-back takes to return the content to rest.
pub const DEFAULT_BOUNCE_DURATION: Duration = Duration::from_millis(400);
/// Native overscroll range, in density-independent units.
pub const DEFAULT_MAX_OVERSCROLL_DISTANCE: f32 = 50.0;
/// Period between two scroll-position samples of the settle detector.
pub const DEFAULT_SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where a snap line sits relative to the viewport. Stored for hosts, not yet
/// consulted by the quantizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapAlignment {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverscrollConfig {
    pub damping_coefficient: f32,
    /// Stiffen resistance the further the content is pulled.
    pub incremental_damping: bool,
    pub bounce_duration: Duration,
    pub bounce_easing: Easing,
    pub disable_bounce_at_start: bool,
    pub disable_bounce_at_end: bool,
    /// Snap grid spacing in density-independent units; 0 disables snapping.
    pub snap_interval: f32,
    pub snap_alignment: SnapAlignment,
    pub deceleration_rate: DecelerationRate,
    /// Device pixels per density-independent unit.
    pub density: f32,
    pub max_overscroll_distance: f32,
    pub settle_poll_interval: Duration,
}

impl Default for OverscrollConfig {
    fn default() -> Self {
        Self {
            damping_coefficient: DEFAULT_DAMPING_COEFFICIENT,
            incremental_damping: true,
            bounce_duration: DEFAULT_BOUNCE_DURATION,
            bounce_easing: Easing::QuartOut,
            disable_bounce_at_start: false,
            disable_bounce_at_end: false,
            snap_interval: 0.0,
            snap_alignment: SnapAlignment::default(),
            deceleration_rate: DecelerationRate::default(),
            density: 1.0,
            max_overscroll_distance: DEFAULT_MAX_OVERSCROLL_DISTANCE,
            settle_poll_interval: DEFAULT_SETTLE_POLL_INTERVAL,
        }
    }
}

impl OverscrollConfig {
    pub fn with_damping(mut self, coefficient: f32, incremental: bool) -> Self {
        self.damping_coefficient = coefficient;
        self.incremental_damping = incremental;
        self
    }

    pub fn with_bounce(mut self, duration: Duration, easing: Easing) -> Self {
        self.bounce_duration = duration;
        self.bounce_easing = easing;
        self
    }

    pub fn with_disabled_bounce(mut self, at_start: bool, at_end: bool) -> Self {
        self.disable_bounce_at_start = at_start;
        self.disable_bounce_at_end = at_end;
        self
    }

    pub fn with_snap(mut self, interval: f32, alignment: SnapAlignment) -> Self {
        self.snap_interval = interval;
        self.snap_alignment = alignment;
        self
    }

    pub fn with_deceleration_rate(mut self, rate: DecelerationRate) -> Self {
        self.deceleration_rate = rate;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_max_overscroll_distance(mut self, distance: f32) -> Self {
        self.max_overscroll_distance = distance;
        self
    }

    pub fn with_settle_poll_interval(mut self, interval: Duration) -> Self {
        self.settle_poll_interval = interval;
        self
    }

    /// Snap interval in device pixels.
    pub fn scaled_snap_interval(&self) -> f32 {
        self.snap_interval * self.density
    }

    pub fn snapping_enabled(&self) -> bool {
        self.scaled_snap_interval() > 0.0
    }

    /// Native overscroll range in device pixels, truncated like a view dimension.
    pub fn scaled_max_overscroll_distance(&self) -> i32 {
        (self.max_overscroll_distance * self.density) as i32
    }

    pub fn bounce_spec(&self) -> AnimationSpec {
        AnimationSpec::tween(self.bounce_duration.as_millis() as u64, self.bounce_easing)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.damping_coefficient.is_finite() || self.damping_coefficient <= 0.0 {
            return Err(ConfigError::InvalidDamping {
                value: self.damping_coefficient,
            });
        }
        if !self.snap_interval.is_finite() || self.snap_interval < 0.0 {
            return Err(ConfigError::InvalidSnapInterval {
                value: self.snap_interval,
            });
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(ConfigError::InvalidDensity {
                value: self.density,
            });
        }
        if !self.max_overscroll_distance.is_finite() || self.max_overscroll_distance < 0.0 {
            return Err(ConfigError::InvalidOverscrollDistance {
                value: self.max_overscroll_distance,
            });
        }
        if self.settle_poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDamping { value: f32 },
    InvalidSnapInterval { value: f32 },
    InvalidDensity { value: f32 },
    InvalidOverscrollDistance { value: f32 },
    ZeroPollInterval,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDamping { value } => {
                write!(f, "damping coefficient must be positive and finite, got {value}")
            }
            ConfigError::InvalidSnapInterval { value } => {
                write!(f, "snap interval must be zero or positive, got {value}")
            }
            ConfigError::InvalidDensity { value } => {
                write!(f, "density must be positive and finite, got {value}")
            }
            ConfigError::InvalidOverscrollDistance { value } => {
                write!(f, "max overscroll distance must not be negative, got {value}")
            }
            ConfigError::ZeroPollInterval => write!(f, "settle poll interval must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
