//! Offline simulation: play many rounds on a synthetic clock with a fixed cash-out target
//! and report the observed return.

use anyhow::{anyhow, bail, Context, Result};
use crashline_execution::{NullSink, RoundStateMachine};
use crashline_types::{HistoryBand, Phase, RoundSettings, Wallet};
use rand::RngCore;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Synthetic time a single round may run before the simulation gives up on it.
const MAX_ROUND_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub rounds: u64,
    /// Cash out once the multiplier reaches this value.
    pub target: f64,
    /// Synthetic time between ticks.
    pub step_ms: u64,
}

impl SimulationParams {
    fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            bail!("rounds must be positive");
        }
        if !self.target.is_finite() || self.target <= 1.0 {
            bail!("target must be a number above 1.0 (got {})", self.target);
        }
        if self.step_ms == 0 {
            bail!("step_ms must be positive");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
struct Stats {
    trials: u64,
    wins: u64,
    total_net: f64,
    total_net_sq: f64,
    total_wagered: f64,
}

impl Stats {
    fn add(&mut self, net: f64, wagered: f64, won: bool) {
        self.trials += 1;
        self.wins += u64::from(won);
        self.total_net += net;
        self.total_net_sq += net * net;
        self.total_wagered += wagered;
    }

    fn mean_net(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_net / self.trials as f64
        }
    }

    fn mean_wagered(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.total_wagered / self.trials as f64
        }
    }

    fn house_edge(&self) -> f64 {
        let mw = self.mean_wagered();
        if mw == 0.0 {
            0.0
        } else {
            -self.mean_net() / mw
        }
    }

    /// Standard error of the house edge.
    fn stderr(&self) -> f64 {
        let mw = self.mean_wagered();
        if self.trials <= 1 || mw == 0.0 {
            return 0.0;
        }
        let mean = self.mean_net();
        let var = (self.total_net_sq / self.trials as f64) - mean * mean;
        let var = if var < 0.0 { 0.0 } else { var };
        (var / self.trials as f64).sqrt() / mw
    }

    fn win_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.wins as f64 / self.trials as f64
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandFractions {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    pub rounds: u64,
    pub target: f64,
    pub stake: f64,
    pub wins: u64,
    pub win_rate: f64,
    /// Average amount returned per unit staked.
    pub mean_return: f64,
    pub house_edge: f64,
    pub house_edge_stderr: f64,
    pub bands: BandFractions,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rounds: {}  target: {:.2}x  stake: {:.2}",
            self.rounds, self.target, self.stake
        )?;
        writeln!(f, "wins: {} ({:.2}%)", self.wins, self.win_rate * 100.0)?;
        writeln!(f, "mean return: {:.4} per unit staked", self.mean_return)?;
        writeln!(
            f,
            "house edge: {:.3}% ± {:.3}%",
            self.house_edge * 100.0,
            self.house_edge_stderr * 100.0
        )?;
        write!(
            f,
            "crash bands: <2x {:.1}%  2-5x {:.1}%  >=5x {:.1}%",
            self.bands.low * 100.0,
            self.bands.medium * 100.0,
            self.bands.high * 100.0
        )
    }
}

/// Run `params.rounds` rounds through the state machine, staking `min_bet` (at least 1)
/// every round and cashing out at `params.target`.
pub fn simulate<R: RngCore>(
    settings: &RoundSettings,
    rng: R,
    params: &SimulationParams,
) -> Result<SimulationReport> {
    params.validate()?;
    let stake = settings.min_bet.max(1.0);
    // Enough to lose every round.
    let bankroll = stake * (params.rounds + 1) as f64;
    let mut machine =
        RoundStateMachine::new(settings.clone(), rng, Wallet::new(bankroll), NullSink)
            .context("invalid round settings")?;

    info!(
        rounds = params.rounds,
        target = params.target,
        step_ms = params.step_ms,
        stake,
        "starting simulation"
    );

    let mut stats = Stats::default();
    let mut bands = [0u64; 3];
    let mut now = 0u64;
    for _ in 0..params.rounds {
        machine.place_bet(stake)?;
        let round_id = machine.start_round(now)?;
        let started = now;
        let mut net = -stake;
        let mut won = false;

        while machine.status() == Phase::Running {
            now = now.saturating_add(params.step_ms);
            if now - started > MAX_ROUND_MS {
                bail!("round {round_id} did not finish within {MAX_ROUND_MS} ms");
            }
            let Some(multiplier) = machine.tick(now) else {
                break;
            };
            if machine.status() == Phase::Running && multiplier >= params.target {
                if let Some(settlement) = machine.cash_out() {
                    net += settlement.winnings;
                    won = true;
                }
            }
        }
        if machine.status() == Phase::CashedOut {
            // Nothing rides on the rest of the round; jump straight to its crash.
            machine.tick(u64::MAX);
            if machine.status() != Phase::Crashed {
                bail!("round {round_id} did not crash");
            }
        }

        let record = machine
            .history()
            .latest()
            .copied()
            .ok_or_else(|| anyhow!("round {round_id} left no history"))?;
        bands[match record.band() {
            HistoryBand::Low => 0,
            HistoryBand::Medium => 1,
            HistoryBand::High => 2,
        }] += 1;
        debug!(round_id, crash_point = record.crash_point, net, "round simulated");
        stats.add(net, stake, won);
        now = now.saturating_add(settings.inter_round_delay_ms);
    }

    let rounds = stats.trials as f64;
    let report = SimulationReport {
        rounds: stats.trials,
        target: params.target,
        stake,
        wins: stats.wins,
        win_rate: stats.win_rate(),
        mean_return: 1.0 - stats.house_edge(),
        house_edge: stats.house_edge(),
        house_edge_stderr: stats.stderr(),
        bands: BandFractions {
            low: bands[0] as f64 / rounds,
            medium: bands[1] as f64 / rounds,
            high: bands[2] as f64 / rounds,
        },
    };
    info!(
        house_edge = report.house_edge,
        win_rate = report.win_rate,
        "simulation finished"
    );
    Ok(report)
}
