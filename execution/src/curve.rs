//! Multiplier growth curves.
//!
//! The displayed multiplier is always recomputed from elapsed wall-clock time, never
//! accumulated per tick, so frame-rate jitter cannot change the payout path.

use crate::ConfigError;
use crashline_types::config::{
    DEFAULT_ACCEL_FACTOR, DEFAULT_BASE_SPEED, DEFAULT_QUADRATIC_DIVISOR,
};
use crashline_types::CurveSpec;

/// Maps elapsed seconds to a multiplier.
///
/// Implementations return `1.0` at `0`, grow strictly for positive elapsed time and treat
/// negative or non-finite input as `0`.
pub trait MultiplierCurve: Send {
    fn value_at(&self, elapsed_secs: f64) -> f64;

    fn name(&self) -> &'static str;
}

fn sanitize(elapsed_secs: f64) -> f64 {
    if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
        elapsed_secs
    } else {
        0.0
    }
}

/// Near-linear start that visibly accelerates:
/// `1 + t * base_speed * (1 + t * accel_factor)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceleratingCurve {
    base_speed: f64,
    accel_factor: f64,
}

impl AcceleratingCurve {
    pub fn new(base_speed: f64, accel_factor: f64) -> Result<Self, ConfigError> {
        if !base_speed.is_finite() || base_speed <= 0.0 {
            return Err(ConfigError::BaseSpeed(base_speed));
        }
        if !accel_factor.is_finite() || accel_factor < 0.0 {
            return Err(ConfigError::AccelFactor(accel_factor));
        }
        Ok(Self {
            base_speed,
            accel_factor,
        })
    }
}

impl Default for AcceleratingCurve {
    fn default() -> Self {
        Self {
            base_speed: DEFAULT_BASE_SPEED,
            accel_factor: DEFAULT_ACCEL_FACTOR,
        }
    }
}

impl MultiplierCurve for AcceleratingCurve {
    fn value_at(&self, elapsed_secs: f64) -> f64 {
        let t = sanitize(elapsed_secs);
        1.0 + t * self.base_speed * (1.0 + t * self.accel_factor)
    }

    fn name(&self) -> &'static str {
        "accelerating"
    }
}

/// `1 + t^2 / divisor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticCurve {
    divisor: f64,
}

impl QuadraticCurve {
    pub fn new(divisor: f64) -> Result<Self, ConfigError> {
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ConfigError::Divisor(divisor));
        }
        Ok(Self { divisor })
    }
}

impl Default for QuadraticCurve {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_QUADRATIC_DIVISOR,
        }
    }
}

impl MultiplierCurve for QuadraticCurve {
    fn value_at(&self, elapsed_secs: f64) -> f64 {
        let t = sanitize(elapsed_secs);
        1.0 + t * t / self.divisor
    }

    fn name(&self) -> &'static str {
        "quadratic"
    }
}

/// Validate a curve spec and build its strategy.
pub fn build_curve(spec: &CurveSpec) -> Result<Box<dyn MultiplierCurve>, ConfigError> {
    Ok(match spec {
        CurveSpec::Accelerating {
            base_speed,
            accel_factor,
        } => Box::new(AcceleratingCurve::new(*base_speed, *accel_factor)?),
        CurveSpec::Quadratic { divisor } => Box::new(QuadraticCurve::new(*divisor)?),
    })
}

/// Evenly spaced `(elapsed, multiplier)` samples from `0` to `elapsed_secs` inclusive,
/// for chart collaborators.
pub fn curve_points(
    curve: &dyn MultiplierCurve,
    elapsed_secs: f64,
    samples: usize,
) -> Vec<(f64, f64)> {
    let end = sanitize(elapsed_secs);
    if samples == 0 {
        return Vec::new();
    }
    if samples == 1 {
        return vec![(end, curve.value_at(end))];
    }
    let step = end / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let t = step * i as f64;
            (t, curve.value_at(t))
        })
        .collect()
}
