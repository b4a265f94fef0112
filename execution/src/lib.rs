//! Crashline execution layer.
//!
//! This crate contains the deterministic game logic for a single-player crash table: crash
//! point generation, multiplier curves, the inter-round timer and the round state machine
//! that ties them together.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside execution; every time-dependent operation takes an
//!   explicit `now_ms`.
//! - Only draw randomness from the injected `RngCore`.
//! - Emit events through an [`EventSink`] in the order state changes happen.
//!
//! The primary entrypoint is [`RoundStateMachine`].
//!
//! ## Minimal round (example)
//! ```rust
//! use crashline_execution::{RoundStateMachine, NullSink};
//! use crashline_types::{Phase, RoundSettings, Wallet};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut machine = RoundStateMachine::new(
//!     RoundSettings::default(),
//!     StdRng::seed_from_u64(7),
//!     Wallet::new(100.0),
//!     NullSink,
//! )
//! .unwrap();
//! machine.place_bet(10.0).unwrap();
//! machine.start_round(0).unwrap();
//! machine.tick(250);
//! if machine.status() == Phase::Running {
//!     machine.cash_out();
//! }
//! ```

pub mod crash_point;
pub mod curve;
pub mod history;
pub mod intermission;
pub mod sink;
pub mod state_machine;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod scenario_tests;

mod error;

pub use crash_point::{
    build_distribution, CrashDistribution, CrashPointGenerator, CrashTier,
    HouseEdgeDistribution, TieredDistribution, UniformDistribution, MIN_CRASH_POINT,
};
pub use curve::{build_curve, curve_points, AcceleratingCurve, MultiplierCurve, QuadraticCurve};
pub use error::ConfigError;
pub use history::RoundHistory;
pub use intermission::Intermission;
pub use sink::{EventSink, NullSink};
pub use state_machine::{validate_settings, CashOut, RoundStateMachine};
