//! Common types used throughout crashline.
//!
//! Rounds, bets, the wallet, the event stream emitted by the round state machine, the
//! error taxonomy returned to players and the serde configuration specs. Nothing in this
//! crate depends on a clock or a random source.

pub mod bet;
pub mod config;
pub mod error;
pub mod event;
pub mod round;

pub use bet::{parse_amount, Bet, Wallet};
pub use config::{CurveSpec, DistributionSpec, RoundSettings, TierSpec};
pub use error::GameError;
pub use event::RoundEvent;
pub use round::{CrashRecord, HistoryBand, Phase, Round, RoundId};
