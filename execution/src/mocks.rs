//! Deterministic strategies for tests and replay.
//!
//! `FixedDistribution` forces crash points in order; `LinearCurve` grows at a constant
//! rate so expected multipliers can be read straight off the timestamps.

use crate::crash_point::{CrashDistribution, CrashPointGenerator, MIN_CRASH_POINT};
use crate::curve::MultiplierCurve;
use crate::state_machine::RoundStateMachine;
use crate::sink::EventSink;
use crashline_types::{RoundSettings, Wallet};
use rand::rngs::mock::StepRng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Yields the given crash points in order, repeating the last one once exhausted.
#[derive(Debug)]
pub struct FixedDistribution {
    points: Vec<f64>,
    next: AtomicUsize,
}

impl FixedDistribution {
    pub fn new(points: &[f64]) -> Self {
        Self {
            points: points.to_vec(),
            next: AtomicUsize::new(0),
        }
    }
}

impl CrashDistribution for FixedDistribution {
    fn sample(&self, _rng: &mut dyn rand::RngCore) -> f64 {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.points
            .get(index)
            .or_else(|| self.points.last())
            .copied()
            .unwrap_or(MIN_CRASH_POINT)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// `1 + rate * t`.
#[derive(Clone, Copy, Debug)]
pub struct LinearCurve {
    rate: f64,
}

impl LinearCurve {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl MultiplierCurve for LinearCurve {
    fn value_at(&self, elapsed_secs: f64) -> f64 {
        let t = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            elapsed_secs
        } else {
            0.0
        };
        1.0 + self.rate * t
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Machine with forced crash points and the supplied curve.
pub fn scripted_machine<S: EventSink>(
    settings: RoundSettings,
    crash_points: &[f64],
    curve: Box<dyn MultiplierCurve>,
    balance: f64,
    sink: S,
) -> RoundStateMachine<StepRng, S> {
    let generator = CrashPointGenerator::new(
        Box::new(FixedDistribution::new(crash_points)),
        StepRng::new(0, 1),
    );
    match RoundStateMachine::with_strategies(settings, generator, curve, Wallet::new(balance), sink)
    {
        Ok(machine) => machine,
        Err(err) => panic!("invalid test settings: {err}"),
    }
}
