//! Interactive table loop.
//!
//! One task owns the [`Table`] and `select!`s over the scheduler interval, stdin lines and
//! Ctrl-C, applying each input to the state machine in arrival order. Events leave the
//! machine through a [`ChannelSink`] and are drained after every input, so rendering and
//! wallet persistence see them in emission order.

use crate::command::{parse_command, CommandError, PlayerCommand, HELP};
use crate::config::TableConfig;
use crate::render::{sparkline, Renderer};
use crate::store::WalletStore;
use anyhow::{Context, Result};
use crashline_execution::{EventSink, RoundStateMachine};
use crashline_types::{RoundEvent, Wallet};
use rand::RngCore;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

const SPARKLINE_WIDTH: usize = 32;

/// Forwards machine events to the table loop.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<RoundEvent>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RoundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: RoundEvent) {
        // The receiver lives in the same `Table` and outlives the machine.
        let _ = self.tx.send(event);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Table<R: RngCore> {
    machine: RoundStateMachine<R, ChannelSink>,
    events: mpsc::UnboundedReceiver<RoundEvent>,
    store: Box<dyn WalletStore + Send>,
    wallet_id: String,
    renderer: Renderer,
}

impl<R: RngCore> Table<R> {
    /// Restore the wallet from `store` and build the machine from `config`.
    pub fn open(config: &TableConfig, rng: R, store: Box<dyn WalletStore + Send>) -> Result<Self> {
        let balance = store
            .load(&config.wallet_id)?
            .unwrap_or(config.starting_balance);
        let (sink, events) = ChannelSink::channel();
        let machine =
            RoundStateMachine::new(config.round.clone(), rng, Wallet::new(balance), sink)
                .context("invalid round settings")?;
        info!(wallet_id = %config.wallet_id, balance, "table opened");
        Ok(Self::new(machine, events, store, &config.wallet_id, config.json))
    }

    pub fn new(
        machine: RoundStateMachine<R, ChannelSink>,
        events: mpsc::UnboundedReceiver<RoundEvent>,
        store: Box<dyn WalletStore + Send>,
        wallet_id: &str,
        json: bool,
    ) -> Self {
        Self {
            machine,
            events,
            store,
            wallet_id: wallet_id.to_string(),
            renderer: Renderer::new(json),
        }
    }

    /// Arm the first round.
    pub fn start(&mut self, now_ms: u64) -> Vec<String> {
        let mut lines = vec![self
            .renderer
            .info(&format!("Balance: {:.2}", self.machine.balance()))];
        self.machine.schedule_next(now_ms);
        if let Some(remaining) = self.machine.next_round_in(now_ms) {
            let secs = remaining as f64 / 1000.0;
            lines.push(self.renderer.info(&format!(
                "First round in {secs:.0}s. Type \"help\" for commands."
            )));
        }
        lines
    }

    /// Scheduler pulse.
    pub fn pulse(&mut self, now_ms: u64) -> Vec<String> {
        self.machine.advance(now_ms);
        self.drain(now_ms)
    }

    pub fn handle_line(&mut self, line: &str, now_ms: u64) -> (Flow, Vec<String>) {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(CommandError::Empty) => return (Flow::Continue, Vec::new()),
            Err(CommandError::Amount(err)) => {
                return (Flow::Continue, vec![self.renderer.error(err.code(), &err)])
            }
            Err(err) => {
                return (Flow::Continue, vec![self.renderer.error("INVALID_COMMAND", &err)])
            }
        };

        let mut lines = Vec::new();
        match command {
            PlayerCommand::Bet(amount) => {
                if let Err(err) = self.machine.place_bet(amount) {
                    lines.push(self.renderer.error(err.code(), &err));
                }
            }
            PlayerCommand::CashOut => {
                if self.machine.cash_out().is_none() {
                    lines.push(self.renderer.info("Nothing to cash out."));
                }
            }
            PlayerCommand::History => lines.push(self.renderer.history(self.machine.history())),
            PlayerCommand::Balance => lines.push(
                self.renderer
                    .info(&format!("Balance: {:.2}", self.machine.balance())),
            ),
            PlayerCommand::Help => lines.push(self.renderer.info(HELP)),
            PlayerCommand::Quit => return (Flow::Quit, self.drain(now_ms)),
        }
        let mut drained = self.drain(now_ms);
        drained.append(&mut lines);
        (Flow::Continue, drained)
    }

    /// Disarm the pending round, refund a stake that never rode and persist the wallet.
    pub fn shutdown(&mut self) -> Result<()> {
        self.machine.cancel_schedule();
        if let Some(bet) = self.machine.cancel_bet() {
            info!(round_id = bet.round_id, amount = bet.amount, "refunded unplayed bet");
        }
        let balance = self.machine.balance();
        self.store
            .save(&self.wallet_id, balance)
            .context("Failed to save wallet on shutdown")?;
        info!(wallet_id = %self.wallet_id, balance, "table closed");
        Ok(())
    }

    pub fn machine(&self) -> &RoundStateMachine<R, ChannelSink> {
        &self.machine
    }

    pub fn store(&self) -> &dyn WalletStore {
        self.store.as_ref()
    }

    fn drain(&mut self, now_ms: u64) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let RoundEvent::BalanceChanged { balance } = event {
                if let Err(err) = self.store.save(&self.wallet_id, balance) {
                    warn!(?err, wallet_id = %self.wallet_id, "failed to persist wallet");
                }
            }
            if let Some(line) = self.renderer.event(&event) {
                lines.push(line);
            }
            if matches!(event, RoundEvent::Crashed { .. }) && !self.renderer.is_json() {
                if let Some(round) = self.machine.current_round() {
                    lines.push(sparkline(
                        self.machine.curve(),
                        round.elapsed_secs(now_ms),
                        SPARKLINE_WIDTH,
                    ));
                }
            }
        }
        lines
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// Run the table until the player quits or `shutdown` resolves. Once `input` is exhausted
/// the table keeps running rounds until `shutdown` fires.
pub async fn run<R, I, F>(table: &mut Table<R>, tick_ms: u64, input: I, shutdown: F) -> Result<()>
where
    R: RngCore,
    I: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    let started = Instant::now();
    let now_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    print_lines(table.start(now_ms()));

    let mut interval = time::interval(Duration::from_millis(tick_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => print_lines(table.pulse(now_ms())),
            line = lines.next_line(), if input_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("stdin closed; waiting for Ctrl-C");
                    input_open = false;
                    continue;
                };
                let (flow, output) = table.handle_line(&line, now_ms());
                print_lines(output);
                if flow == Flow::Quit {
                    break;
                }
            }
            result = &mut shutdown => {
                result.context("Failed to listen for ctrl-c")?;
                info!("interrupted");
                break;
            }
        }
    }

    table.shutdown()
}
