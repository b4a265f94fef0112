use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic round identifier. The first round is `1`.
pub type RoundId = u64;

/// Crash points below this are rendered in the low band.
pub const MEDIUM_BAND_FLOOR: f64 = 2.0;

/// Crash points at or above this are rendered in the high band.
pub const HIGH_BAND_FLOOR: f64 = 5.0;

/// Phase of the round state machine.
///
/// `Idle` and `Pending` precede the draw of a round, so the phase lives on the machine
/// rather than on [`Round`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No round is live and no bet is staked.
    Idle,
    /// A bet is staked on the upcoming round.
    Pending,
    /// A round is live and the multiplier is rising.
    Running,
    /// The player cashed out; the house round keeps running until it crashes.
    CashedOut,
    /// The last round crashed. Behaves like `Idle` for betting.
    Crashed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Pending => "pending",
            Phase::Running => "running",
            Phase::CashedOut => "cashed_out",
            Phase::Crashed => "crashed",
        }
    }

    /// Whether a round is currently live (the multiplier is advancing).
    pub fn is_live(&self) -> bool {
        matches!(self, Phase::Running | Phase::CashedOut)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single round. The crash point is drawn once when the round starts and never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub crash_point: f64,
    pub start_time_ms: u64,
}

impl Round {
    pub fn new(id: RoundId, crash_point: f64, start_time_ms: u64) -> Self {
        Self {
            id,
            crash_point,
            start_time_ms,
        }
    }

    /// Seconds elapsed since the round started. Timestamps before the start clamp to zero.
    pub fn elapsed_secs(&self, now_ms: u64) -> f64 {
        now_ms.saturating_sub(self.start_time_ms) as f64 / 1_000.0
    }
}

/// Display band of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBand {
    Low,
    Medium,
    High,
}

impl HistoryBand {
    pub fn for_crash_point(crash_point: f64) -> Self {
        if crash_point >= HIGH_BAND_FLOOR {
            HistoryBand::High
        } else if crash_point >= MEDIUM_BAND_FLOOR {
            HistoryBand::Medium
        } else {
            HistoryBand::Low
        }
    }
}

/// Entry of the round history.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrashRecord {
    pub round_id: RoundId,
    pub crash_point: f64,
}

impl CrashRecord {
    pub fn band(&self) -> HistoryBand {
        HistoryBand::for_crash_point(self.crash_point)
    }
}

impl fmt::Display for CrashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.crash_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_secs_clamps_before_start() {
        let round = Round::new(1, 2.0, 10_000);
        assert_eq!(round.elapsed_secs(9_000), 0.0);
        assert_eq!(round.elapsed_secs(12_500), 2.5);
    }

    #[test]
    fn test_history_band_boundaries() {
        assert_eq!(HistoryBand::for_crash_point(1.0), HistoryBand::Low);
        assert_eq!(HistoryBand::for_crash_point(1.99), HistoryBand::Low);
        assert_eq!(HistoryBand::for_crash_point(2.0), HistoryBand::Medium);
        assert_eq!(HistoryBand::for_crash_point(4.99), HistoryBand::Medium);
        assert_eq!(HistoryBand::for_crash_point(5.0), HistoryBand::High);
        assert_eq!(HistoryBand::for_crash_point(100.0), HistoryBand::High);
    }

    #[test]
    fn test_phase_liveness() {
        assert!(Phase::Running.is_live());
        assert!(Phase::CashedOut.is_live());
        assert!(!Phase::Idle.is_live());
        assert!(!Phase::Pending.is_live());
        assert!(!Phase::Crashed.is_live());
    }

    #[test]
    fn test_crash_record_display() {
        let record = CrashRecord {
            round_id: 3,
            crash_point: 1.2,
        };
        assert_eq!(record.to_string(), "1.20x");
    }
}
