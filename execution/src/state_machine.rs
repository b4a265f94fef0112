//! Round state machine for the crash game.
//!
//! The machine owns every piece of mutable game state (wallet, active bet, current round,
//! history, inter-round timer) and is driven by explicit timestamps, so it never reads a
//! clock itself. Callers feed it from a single event queue:
//!
//! - `place_bet` / `cash_out` when the player acts,
//! - `advance(now_ms)` on every scheduler pulse.
//!
//! ## Phases
//!
//! ```text
//! Idle ──bet──► Pending ──start──► Running ──cash out──► CashedOut
//!   │                                 │                     │
//!   └──────────────start──────────────┤                     │
//!                                     ▼                     ▼
//!                                  Crashed ◄──────crash─────┘
//!                                     │
//!                                     └── intermission ──► start (Running)
//! ```
//!
//! `Crashed` doubles as the intermission phase and accepts bets like `Idle`.
//!
//! ## Crash/cash-out ordering
//!
//! `cash_out` settles against the multiplier computed by the most recent `tick`. A tick
//! that reaches the crash point resolves the round before any later cash-out is processed,
//! so a cash-out can never be paid from a value computed after it was requested.

use crate::crash_point::{build_distribution, CrashDistribution, CrashPointGenerator};
use crate::curve::{build_curve, MultiplierCurve};
use crate::history::RoundHistory;
use crate::intermission::Intermission;
use crate::sink::EventSink;
use crate::ConfigError;
use crashline_types::{
    Bet, CrashRecord, GameError, Phase, Round, RoundEvent, RoundId, RoundSettings, Wallet,
};
use rand::RngCore;
use tracing::{debug, info, warn};

/// Settlement of a successful cash-out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CashOut {
    pub round_id: RoundId,
    pub amount: f64,
    pub multiplier: f64,
    pub winnings: f64,
}

/// Check the non-strategy settings.
pub fn validate_settings(settings: &RoundSettings) -> Result<(), ConfigError> {
    if settings.history_capacity == 0 {
        return Err(ConfigError::HistoryCapacity);
    }
    if !settings.min_bet.is_finite() || settings.min_bet < 0.0 {
        return Err(ConfigError::MinBet(settings.min_bet));
    }
    if settings.announce_lead_ms > settings.inter_round_delay_ms {
        return Err(ConfigError::AnnounceLead {
            lead_ms: settings.announce_lead_ms,
            delay_ms: settings.inter_round_delay_ms,
        });
    }
    Ok(())
}

pub struct RoundStateMachine<R: RngCore, S: EventSink> {
    settings: RoundSettings,
    generator: CrashPointGenerator<R>,
    curve: Box<dyn MultiplierCurve>,
    sink: S,
    wallet: Wallet,
    history: RoundHistory,
    intermission: Intermission,
    phase: Phase,
    round: Option<Round>,
    bet: Option<Bet>,
    multiplier: f64,
    last_round_id: RoundId,
}

impl<R: RngCore, S: EventSink> RoundStateMachine<R, S> {
    /// Build a machine whose curve and distribution come from `settings`.
    pub fn new(settings: RoundSettings, rng: R, wallet: Wallet, sink: S) -> Result<Self, ConfigError> {
        let distribution = build_distribution(&settings.distribution)?;
        let curve = build_curve(&settings.curve)?;
        Self::with_strategies(
            settings,
            CrashPointGenerator::new(distribution, rng),
            curve,
            wallet,
            sink,
        )
    }

    /// Build a machine with explicit strategies. The curve and distribution specs in
    /// `settings` are ignored.
    pub fn with_strategies(
        settings: RoundSettings,
        generator: CrashPointGenerator<R>,
        curve: Box<dyn MultiplierCurve>,
        wallet: Wallet,
        sink: S,
    ) -> Result<Self, ConfigError> {
        validate_settings(&settings)?;
        let history = RoundHistory::new(settings.history_capacity);
        let intermission =
            Intermission::new(settings.inter_round_delay_ms, settings.announce_lead_ms);
        Ok(Self {
            settings,
            generator,
            curve,
            sink,
            wallet,
            history,
            intermission,
            phase: Phase::Idle,
            round: None,
            bet: None,
            multiplier: 1.0,
            last_round_id: 0,
        })
    }

    /// Stake `amount` on the upcoming round. The wallet is debited immediately.
    pub fn place_bet(&mut self, amount: f64) -> Result<Bet, GameError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GameError::InvalidAmount(format!(
                "must be a positive number: {amount}"
            )));
        }
        if amount < self.settings.min_bet {
            return Err(GameError::InvalidAmount(format!(
                "minimum bet is {:.2}",
                self.settings.min_bet
            )));
        }
        if !self.wallet.can_cover(amount) {
            return Err(GameError::InsufficientFunds {
                amount,
                balance: self.wallet.balance(),
            });
        }
        if self.phase.is_live() {
            return Err(GameError::RoundInProgress);
        }
        if self.bet.is_some() {
            return Err(GameError::BetAlreadyPlaced);
        }

        let balance = self.wallet.debit(amount)?;
        let bet = Bet {
            amount,
            round_id: self.last_round_id.saturating_add(1),
        };
        self.bet = Some(bet);
        self.phase = Phase::Pending;
        info!(round_id = bet.round_id, amount, balance, "bet placed");
        self.sink.emit(RoundEvent::BetPlaced {
            round_id: bet.round_id,
            amount,
        });
        self.sink.emit(RoundEvent::BalanceChanged { balance });
        Ok(bet)
    }

    /// Draw a crash point and start the next round at `now_ms`.
    pub fn start_round(&mut self, now_ms: u64) -> Result<RoundId, GameError> {
        if self.phase.is_live() {
            return Err(GameError::RoundInProgress);
        }
        let crash_point = self.generator.draw();
        let round_id = self.last_round_id.saturating_add(1);
        self.last_round_id = round_id;
        self.round = Some(Round::new(round_id, crash_point, now_ms));
        self.multiplier = 1.0;
        self.intermission.cancel();
        self.phase = Phase::Running;
        info!(round_id, has_bet = self.bet.is_some(), "round started");
        debug!(round_id, crash_point, "crash point drawn");
        self.sink.emit(RoundEvent::RoundStarted {
            round_id,
            start_time_ms: now_ms,
        });
        Ok(round_id)
    }

    /// Re-evaluate the multiplier at `now_ms`. Returns the displayed multiplier, or `None`
    /// when no round is live.
    pub fn tick(&mut self, now_ms: u64) -> Option<f64> {
        if !self.phase.is_live() {
            return None;
        }
        let round = self.round.as_ref()?;
        let (round_id, crash_point) = (round.id, round.crash_point);
        let value = self
            .curve
            .value_at(round.elapsed_secs(now_ms))
            .max(self.multiplier);

        if value >= crash_point {
            self.resolve_crash(round_id, crash_point, now_ms);
            return Some(crash_point);
        }

        self.multiplier = value;
        self.sink.emit(RoundEvent::MultiplierTick {
            round_id,
            multiplier: value,
        });
        Some(value)
    }

    /// Lock in the last computed multiplier. A no-op without an active bet or outside a
    /// running round.
    pub fn cash_out(&mut self) -> Option<CashOut> {
        if self.phase != Phase::Running {
            debug!(phase = %self.phase, "cash out ignored");
            return None;
        }
        let Some(bet) = self.bet.take() else {
            debug!("cash out ignored: no active bet");
            return None;
        };
        let round_id = self.round.as_ref().map_or(bet.round_id, |round| round.id);
        let multiplier = self.multiplier;
        let winnings = bet.amount * multiplier;
        let balance = self.wallet.credit(winnings);
        self.phase = Phase::CashedOut;
        info!(round_id, multiplier, winnings, balance, "cashed out");
        self.sink.emit(RoundEvent::CashedOut {
            round_id,
            multiplier,
            winnings,
        });
        self.sink.emit(RoundEvent::BalanceChanged { balance });
        Some(CashOut {
            round_id,
            amount: bet.amount,
            multiplier,
            winnings,
        })
    }

    /// Withdraw a bet that has not started riding yet and refund the stake. Returns `None`
    /// while a round is live or when nothing is staked.
    pub fn cancel_bet(&mut self) -> Option<Bet> {
        if self.phase != Phase::Pending {
            return None;
        }
        let bet = self.bet.take()?;
        let balance = self.wallet.credit(bet.amount);
        self.phase = if self.round.is_some() {
            Phase::Crashed
        } else {
            Phase::Idle
        };
        info!(round_id = bet.round_id, amount = bet.amount, balance, "bet cancelled");
        self.sink.emit(RoundEvent::BalanceChanged { balance });
        Some(bet)
    }

    /// Arm the timer for the next round start. Ignored while a round is live.
    pub fn schedule_next(&mut self, now_ms: u64) -> Option<u64> {
        if self.phase.is_live() {
            return None;
        }
        let starts_at = self.intermission.arm(now_ms);
        debug!(starts_at_ms = starts_at, "next round scheduled");
        Some(starts_at)
    }

    /// Disarm a pending round start. Returns whether one was pending.
    pub fn cancel_schedule(&mut self) -> bool {
        let cancelled = self.intermission.cancel();
        if cancelled {
            info!("pending round start cancelled");
        }
        cancelled
    }

    /// Scheduler pulse: tick the live round, or run the intermission.
    pub fn advance(&mut self, now_ms: u64) {
        if self.phase.is_live() {
            self.tick(now_ms);
            return;
        }
        if self.intermission.is_due(now_ms) {
            if let Err(err) = self.start_round(now_ms) {
                warn!(?err, "scheduled round start failed");
            }
            return;
        }
        if let Some(starts_at_ms) = self.intermission.should_announce(now_ms) {
            self.sink.emit(RoundEvent::NextRoundSoon { starts_at_ms });
        }
    }

    /// Replace the curve. Refused while a round is live so a round never changes law.
    pub fn set_curve(&mut self, curve: Box<dyn MultiplierCurve>) -> Result<(), GameError> {
        if self.phase.is_live() {
            return Err(GameError::RoundInProgress);
        }
        self.curve = curve;
        Ok(())
    }

    /// Replace the crash distribution. The current round's crash point is unaffected.
    pub fn set_distribution(&mut self, distribution: Box<dyn CrashDistribution>) {
        self.generator.set_distribution(distribution);
    }

    fn resolve_crash(&mut self, round_id: RoundId, crash_point: f64, now_ms: u64) {
        self.multiplier = crash_point;
        let forfeited = self.bet.take();
        self.phase = Phase::Crashed;
        self.history.record(CrashRecord {
            round_id,
            crash_point,
        });
        let starts_at = self.intermission.arm(now_ms);
        info!(
            round_id,
            crash_point,
            bet_lost = forfeited.is_some(),
            next_round_at_ms = starts_at,
            "round crashed"
        );
        self.sink.emit(RoundEvent::Crashed {
            round_id,
            crash_point,
            bet_lost: forfeited.is_some(),
        });
    }

    pub fn status(&self) -> Phase {
        self.phase
    }

    /// Last displayed multiplier. Equals the crash point after a crash.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn balance(&self) -> f64 {
        self.wallet.balance()
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn active_bet(&self) -> Option<&Bet> {
        self.bet.as_ref()
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn next_round_at(&self) -> Option<u64> {
        self.intermission.starts_at()
    }

    /// Milliseconds until the armed round start, zero once it is due.
    pub fn next_round_in(&self, now_ms: u64) -> Option<u64> {
        self.intermission.remaining_ms(now_ms)
    }

    /// Settings the machine was built with. The `curve` and `distribution` specs describe
    /// the running strategies only for a machine built by [`Self::new`] whose strategies
    /// were never replaced; [`Self::curve`] and [`Self::distribution`] report the live ones.
    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    pub fn curve(&self) -> &dyn MultiplierCurve {
        self.curve.as_ref()
    }

    pub fn distribution(&self) -> &dyn CrashDistribution {
        self.generator.distribution()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
