//! Serializable configuration for the round state machine.
//!
//! These are plain specs; the execution crate validates them and turns them into curve and
//! distribution strategies.

use serde::{Deserialize, Serialize};

/// Pause between a crash and the next round start.
pub const DEFAULT_INTER_ROUND_DELAY_MS: u64 = 7_000;

/// How long before the next start the "next round" notice goes out.
pub const DEFAULT_ANNOUNCE_LEAD_MS: u64 = 3_000;

/// Number of crash points kept in the round history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Smallest accepted stake.
pub const DEFAULT_MIN_BET: f64 = 3.0;

/// Linear growth rate of the accelerating curve, per second.
pub const DEFAULT_BASE_SPEED: f64 = 0.1;

/// Acceleration of the accelerating curve, per second.
pub const DEFAULT_ACCEL_FACTOR: f64 = 0.1;

/// Divisor of the quadratic curve (`1 + t^2 / divisor`).
pub const DEFAULT_QUADRATIC_DIVISOR: f64 = 10.0;

/// Lower clamp of the house-edge distribution.
pub const DEFAULT_HOUSE_EDGE_FLOOR: f64 = 1.2;

/// Range of the uniform distribution.
pub const DEFAULT_UNIFORM_MIN: f64 = 1.0;
pub const DEFAULT_UNIFORM_MAX: f64 = 10.0;

/// Growth law of the displayed multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveSpec {
    /// `1 + t * base_speed * (1 + t * accel_factor)`.
    Accelerating {
        #[serde(default = "default_base_speed")]
        base_speed: f64,
        #[serde(default = "default_accel_factor")]
        accel_factor: f64,
    },
    /// `1 + t^2 / divisor`.
    Quadratic {
        #[serde(default = "default_quadratic_divisor")]
        divisor: f64,
    },
}

impl Default for CurveSpec {
    fn default() -> Self {
        CurveSpec::Accelerating {
            base_speed: DEFAULT_BASE_SPEED,
            accel_factor: DEFAULT_ACCEL_FACTOR,
        }
    }
}

/// One tier of a tiered crash distribution.
///
/// `threshold` is cumulative: a uniform draw `r` selects the first tier with
/// `r < threshold`. The tier then yields a value in `[min, max)` (exactly `min` when the
/// two are equal).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub threshold: f64,
    pub min: f64,
    pub max: f64,
}

impl TierSpec {
    pub const fn new(threshold: f64, min: f64, max: f64) -> Self {
        Self { threshold, min, max }
    }
}

/// The 10% / 30% / 60% mixture: rare 100x moons, a [2, 10) middle and early crashes in
/// [1, 1.5).
pub fn default_tiers() -> Vec<TierSpec> {
    vec![
        TierSpec::new(0.10, 100.0, 100.0),
        TierSpec::new(0.40, 2.0, 10.0),
        TierSpec::new(1.0, 1.0, 1.5),
    ]
}

/// Crash point distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    Tiered {
        #[serde(default = "default_tiers")]
        tiers: Vec<TierSpec>,
    },
    /// `max(floor, 1 / (1 - r))`.
    HouseEdge {
        #[serde(default = "default_house_edge_floor")]
        floor: f64,
    },
    Uniform {
        #[serde(default = "default_uniform_min")]
        min: f64,
        #[serde(default = "default_uniform_max")]
        max: f64,
    },
}

impl Default for DistributionSpec {
    fn default() -> Self {
        DistributionSpec::Tiered {
            tiers: default_tiers(),
        }
    }
}

/// Constants accepted by the round state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    pub inter_round_delay_ms: u64,
    pub announce_lead_ms: u64,
    pub history_capacity: usize,
    pub min_bet: f64,
    pub curve: CurveSpec,
    pub distribution: DistributionSpec,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            inter_round_delay_ms: DEFAULT_INTER_ROUND_DELAY_MS,
            announce_lead_ms: DEFAULT_ANNOUNCE_LEAD_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_bet: DEFAULT_MIN_BET,
            curve: CurveSpec::default(),
            distribution: DistributionSpec::default(),
        }
    }
}

fn default_base_speed() -> f64 {
    DEFAULT_BASE_SPEED
}

fn default_accel_factor() -> f64 {
    DEFAULT_ACCEL_FACTOR
}

fn default_quadratic_divisor() -> f64 {
    DEFAULT_QUADRATIC_DIVISOR
}

fn default_house_edge_floor() -> f64 {
    DEFAULT_HOUSE_EDGE_FLOOR
}

fn default_uniform_min() -> f64 {
    DEFAULT_UNIFORM_MIN
}

fn default_uniform_max() -> f64 {
    DEFAULT_UNIFORM_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_yields_defaults() {
        let settings: RoundSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, RoundSettings::default());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
inter_round_delay_ms: 5000
min_bet: 0.1
curve:
  kind: quadratic
distribution:
  kind: house_edge
  floor: 1.5
"#;
        let settings: RoundSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.inter_round_delay_ms, 5_000);
        assert_eq!(settings.min_bet, 0.1);
        assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(
            settings.curve,
            CurveSpec::Quadratic {
                divisor: DEFAULT_QUADRATIC_DIVISOR
            }
        );
        assert_eq!(settings.distribution, DistributionSpec::HouseEdge { floor: 1.5 });
    }

    #[test]
    fn test_tiered_yaml_without_tiers_uses_defaults() {
        let spec: DistributionSpec = serde_yaml::from_str("kind: tiered").unwrap();
        assert_eq!(spec, DistributionSpec::default());
    }

    #[test]
    fn test_custom_tiers_yaml() {
        let yaml = r#"
kind: tiered
tiers:
  - { threshold: 0.5, min: 1.0, max: 2.0 }
  - { threshold: 1.0, min: 2.0, max: 4.0 }
"#;
        let spec: DistributionSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            spec,
            DistributionSpec::Tiered {
                tiers: vec![TierSpec::new(0.5, 1.0, 2.0), TierSpec::new(1.0, 2.0, 4.0)]
            }
        );
    }

    #[test]
    fn test_default_tiers_cover_unit_interval() {
        let tiers = default_tiers();
        assert_eq!(tiers.last().map(|t| t.threshold), Some(1.0));
        assert!(tiers.windows(2).all(|w| w[0].threshold < w[1].threshold));
    }
}
