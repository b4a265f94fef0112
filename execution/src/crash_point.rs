//! Crash point generation.
//!
//! A [`CrashPointGenerator`] owns the injected uniform random source and delegates the
//! shape of the distribution to a [`CrashDistribution`] strategy, so the payout policy can
//! be swapped without touching the round state machine.

use crate::ConfigError;
use crashline_types::config::{
    DEFAULT_HOUSE_EDGE_FLOOR, DEFAULT_UNIFORM_MAX, DEFAULT_UNIFORM_MIN,
};
use crashline_types::{DistributionSpec, TierSpec};
use rand::{Rng, RngCore};

/// Smallest crash point the generator returns. A round never crashes at exactly 1.00x.
pub const MIN_CRASH_POINT: f64 = 1.0 + f64::EPSILON;

/// Strategy that maps uniform draws to a crash point.
pub trait CrashDistribution: Send {
    /// Sample a crash point. Implementations draw `[0, 1)` uniforms from `rng`.
    fn sample(&self, rng: &mut dyn RngCore) -> f64;

    fn name(&self) -> &'static str;
}

/// Tier of a [`TieredDistribution`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrashTier {
    pub threshold: f64,
    pub min: f64,
    pub max: f64,
}

impl CrashTier {
    fn value(&self, r: f64) -> f64 {
        self.min + r * (self.max - self.min)
    }
}

impl From<TierSpec> for CrashTier {
    fn from(spec: TierSpec) -> Self {
        Self {
            threshold: spec.threshold,
            min: spec.min,
            max: spec.max,
        }
    }
}

/// Explicit mixture of ranges selected by a first uniform draw.
#[derive(Clone, Debug, PartialEq)]
pub struct TieredDistribution {
    tiers: Vec<CrashTier>,
}

impl TieredDistribution {
    pub fn new(tiers: Vec<CrashTier>) -> Result<Self, ConfigError> {
        let Some(last) = tiers.last() else {
            return Err(ConfigError::NoTiers);
        };
        if last.threshold != 1.0 {
            return Err(ConfigError::TiersIncomplete(last.threshold));
        }
        let mut previous = 0.0;
        for (index, tier) in tiers.iter().enumerate() {
            if !tier.threshold.is_finite() || tier.threshold <= previous || tier.threshold > 1.0
            {
                return Err(ConfigError::TierThreshold {
                    index,
                    threshold: tier.threshold,
                });
            }
            if !tier.min.is_finite() || !tier.max.is_finite() || tier.min < 1.0 || tier.max < tier.min
            {
                return Err(ConfigError::TierRange {
                    index,
                    min: tier.min,
                    max: tier.max,
                });
            }
            previous = tier.threshold;
        }
        Ok(Self { tiers })
    }

    pub fn from_specs(specs: &[TierSpec]) -> Result<Self, ConfigError> {
        Self::new(specs.iter().copied().map(CrashTier::from).collect())
    }
}

impl Default for TieredDistribution {
    fn default() -> Self {
        Self {
            tiers: crashline_types::config::default_tiers()
                .into_iter()
                .map(CrashTier::from)
                .collect(),
        }
    }
}

impl CrashDistribution for TieredDistribution {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let r: f64 = rng.gen();
        // Thresholds end at 1.0 and r < 1.0, so a tier always matches.
        let Some(tier) = self
            .tiers
            .iter()
            .find(|tier| r < tier.threshold)
            .or_else(|| self.tiers.last())
        else {
            return MIN_CRASH_POINT;
        };
        if tier.min == tier.max {
            return tier.min;
        }
        tier.value(rng.gen())
    }

    fn name(&self) -> &'static str {
        "tiered"
    }
}

/// Continuous `1 / (1 - r)` curve clamped from below.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HouseEdgeDistribution {
    floor: f64,
}

impl HouseEdgeDistribution {
    pub fn new(floor: f64) -> Result<Self, ConfigError> {
        if !floor.is_finite() || floor < 1.0 {
            return Err(ConfigError::Floor(floor));
        }
        Ok(Self { floor })
    }
}

impl Default for HouseEdgeDistribution {
    fn default() -> Self {
        Self {
            floor: DEFAULT_HOUSE_EDGE_FLOOR,
        }
    }
}

impl CrashDistribution for HouseEdgeDistribution {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let r: f64 = rng.gen();
        (1.0 / (1.0 - r)).max(self.floor)
    }

    fn name(&self) -> &'static str {
        "house_edge"
    }
}

/// Flat `[min, max)` range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformDistribution {
    min: f64,
    max: f64,
}

impl UniformDistribution {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min < 1.0 || max <= min {
            return Err(ConfigError::UniformRange { min, max });
        }
        Ok(Self { min, max })
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self {
            min: DEFAULT_UNIFORM_MIN,
            max: DEFAULT_UNIFORM_MAX,
        }
    }
}

impl CrashDistribution for UniformDistribution {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let r: f64 = rng.gen();
        self.min + r * (self.max - self.min)
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Validate a distribution spec and build its strategy.
pub fn build_distribution(
    spec: &DistributionSpec,
) -> Result<Box<dyn CrashDistribution>, ConfigError> {
    Ok(match spec {
        DistributionSpec::Tiered { tiers } => Box::new(TieredDistribution::from_specs(tiers)?),
        DistributionSpec::HouseEdge { floor } => Box::new(HouseEdgeDistribution::new(*floor)?),
        DistributionSpec::Uniform { min, max } => Box::new(UniformDistribution::new(*min, *max)?),
    })
}

/// Draws crash points from an injected random source.
pub struct CrashPointGenerator<R: RngCore> {
    distribution: Box<dyn CrashDistribution>,
    rng: R,
}

impl<R: RngCore> CrashPointGenerator<R> {
    pub fn new(distribution: Box<dyn CrashDistribution>, rng: R) -> Self {
        Self { distribution, rng }
    }

    /// Generator with the default tiered distribution.
    pub fn tiered(rng: R) -> Self {
        Self::new(Box::new(TieredDistribution::default()), rng)
    }

    /// Draw the next crash point. Always strictly above 1.0.
    pub fn draw(&mut self) -> f64 {
        let value = self.distribution.sample(&mut self.rng);
        if value.is_nan() {
            return MIN_CRASH_POINT;
        }
        value.max(MIN_CRASH_POINT)
    }

    pub fn distribution(&self) -> &dyn CrashDistribution {
        self.distribution.as_ref()
    }

    /// Swap the distribution. Takes effect from the next draw.
    pub fn set_distribution(&mut self, distribution: Box<dyn CrashDistribution>) {
        self.distribution = distribution;
    }
}
