use crate::RoundId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notifications emitted by the round state machine to presentation and persistence
/// collaborators, in the order the state changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoundEvent {
    #[serde(rename = "round_started")]
    RoundStarted {
        #[serde(rename = "roundId")]
        round_id: RoundId,
        #[serde(rename = "startTimeMs")]
        start_time_ms: u64,
    },
    #[serde(rename = "multiplier_tick")]
    MultiplierTick {
        #[serde(rename = "roundId")]
        round_id: RoundId,
        multiplier: f64,
    },
    #[serde(rename = "crashed")]
    Crashed {
        #[serde(rename = "roundId")]
        round_id: RoundId,
        #[serde(rename = "crashPoint")]
        crash_point: f64,
        #[serde(rename = "betLost")]
        bet_lost: bool,
    },
    #[serde(rename = "cashed_out")]
    CashedOut {
        #[serde(rename = "roundId")]
        round_id: RoundId,
        multiplier: f64,
        winnings: f64,
    },
    #[serde(rename = "balance_changed")]
    BalanceChanged { balance: f64 },
    #[serde(rename = "bet_placed")]
    BetPlaced {
        #[serde(rename = "roundId")]
        round_id: RoundId,
        amount: f64,
    },
    #[serde(rename = "next_round_soon")]
    NextRoundSoon {
        #[serde(rename = "startsAtMs")]
        starts_at_ms: u64,
    },
}

impl RoundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RoundEvent::RoundStarted { .. } => "round_started",
            RoundEvent::MultiplierTick { .. } => "multiplier_tick",
            RoundEvent::Crashed { .. } => "crashed",
            RoundEvent::CashedOut { .. } => "cashed_out",
            RoundEvent::BalanceChanged { .. } => "balance_changed",
            RoundEvent::BetPlaced { .. } => "bet_placed",
            RoundEvent::NextRoundSoon { .. } => "next_round_soon",
        }
    }
}

impl fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundEvent::RoundStarted { round_id, .. } => {
                write!(f, "Round #{round_id} is running!")
            }
            RoundEvent::MultiplierTick { multiplier, .. } => write!(f, "{multiplier:.2}x"),
            RoundEvent::Crashed {
                crash_point,
                bet_lost,
                ..
            } => {
                write!(f, "CRASHED at {crash_point:.2}x!")?;
                if *bet_lost {
                    write!(f, " You lost your bet!")?;
                }
                Ok(())
            }
            RoundEvent::CashedOut {
                multiplier,
                winnings,
                ..
            } => write!(f, "Cashed out at {multiplier:.2}x! Won {winnings:.2}"),
            RoundEvent::BalanceChanged { balance } => write!(f, "Balance: {balance:.2}"),
            RoundEvent::BetPlaced { amount, .. } => {
                write!(f, "Bet of {amount:.2} placed! Waiting for next round...")
            }
            RoundEvent::NextRoundSoon { .. } => write!(f, "Next round starting..."),
        }
    }
}
