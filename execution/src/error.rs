use thiserror::Error;

/// Rejected configuration. Raised while building strategies or the round state machine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("crash distribution needs at least one tier")]
    NoTiers,
    #[error("last tier threshold must be 1.0 (got {0})")]
    TiersIncomplete(f64),
    #[error("tier {index} threshold must increase within (0, 1] (got {threshold})")]
    TierThreshold { index: usize, threshold: f64 },
    #[error("tier {index} range must satisfy 1.0 <= min <= max (got [{min}, {max}])")]
    TierRange { index: usize, min: f64, max: f64 },
    #[error("house edge floor must be at least 1.0 (got {0})")]
    Floor(f64),
    #[error("uniform range must satisfy 1.0 <= min < max (got [{min}, {max}])")]
    UniformRange { min: f64, max: f64 },
    #[error("curve base_speed must be positive (got {0})")]
    BaseSpeed(f64),
    #[error("curve accel_factor must be non-negative (got {0})")]
    AccelFactor(f64),
    #[error("quadratic curve divisor must be positive (got {0})")]
    Divisor(f64),
    #[error("history capacity must be greater than zero")]
    HistoryCapacity,
    #[error("minimum bet must be a non-negative number (got {0})")]
    MinBet(f64),
    #[error("announce lead ({lead_ms} ms) exceeds the inter-round delay ({delay_ms} ms)")]
    AnnounceLead { lead_ms: u64, delay_ms: u64 },
}
