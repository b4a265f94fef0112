//! End-to-end rounds driven through the public state machine API.

use crate::curve::AcceleratingCurve;
use crate::mocks::{scripted_machine, LinearCurve};
use crate::state_machine::RoundStateMachine;
use crashline_types::{Phase, RoundEvent, RoundSettings};
use proptest::prelude::*;
use rand::rngs::mock::StepRng;

const EPS: f64 = 1e-9;

type Machine = RoundStateMachine<StepRng, Vec<RoundEvent>>;

/// Linear curve reaching 2.5x after 6 s and 3.0x after 8 s.
fn linear_machine(crash_points: &[f64]) -> Machine {
    scripted_machine(
        RoundSettings::default(),
        crash_points,
        Box::new(LinearCurve::new(0.25)),
        100.0,
        Vec::new(),
    )
}

/// Crash the live round by ticking far past any forced crash point.
fn run_to_crash(machine: &mut Machine, now_ms: u64) {
    machine.tick(now_ms);
    assert_eq!(machine.status(), Phase::Crashed);
}

#[test]
fn test_cash_out_before_crash_wins() {
    let mut m = linear_machine(&[3.0]);
    m.place_bet(10.0).unwrap();
    assert_eq!(m.balance(), 90.0);

    assert_eq!(m.start_round(0), Ok(1));
    assert_eq!(m.tick(6_000), Some(2.5));

    let settlement = m.cash_out().unwrap();
    assert_eq!(settlement.multiplier, 2.5);
    assert_eq!(settlement.winnings, 25.0);
    assert_eq!(m.balance(), 115.0);
    assert_eq!(m.status(), Phase::CashedOut);
    assert!(m.active_bet().is_none());

    // House round keeps running until it crashes.
    assert_eq!(m.tick(7_000), Some(2.75));
    assert_eq!(m.status(), Phase::CashedOut);
    assert_eq!(m.tick(8_000), Some(3.0));
    assert_eq!(m.status(), Phase::Crashed);
    assert_eq!(m.balance(), 115.0);

    assert_eq!(
        m.sink(),
        &vec![
            RoundEvent::BetPlaced { round_id: 1, amount: 10.0 },
            RoundEvent::BalanceChanged { balance: 90.0 },
            RoundEvent::RoundStarted { round_id: 1, start_time_ms: 0 },
            RoundEvent::MultiplierTick { round_id: 1, multiplier: 2.5 },
            RoundEvent::CashedOut { round_id: 1, multiplier: 2.5, winnings: 25.0 },
            RoundEvent::BalanceChanged { balance: 115.0 },
            RoundEvent::MultiplierTick { round_id: 1, multiplier: 2.75 },
            RoundEvent::Crashed { round_id: 1, crash_point: 3.0, bet_lost: false },
        ]
    );
}

#[test]
fn test_crash_without_cash_out_loses_bet() {
    let mut m = scripted_machine(
        RoundSettings::default(),
        &[1.2],
        Box::new(AcceleratingCurve::default()),
        100.0,
        Vec::new(),
    );
    m.place_bet(10.0).unwrap();
    m.start_round(0).unwrap();

    let first = m.tick(1_000).unwrap();
    assert!((first - 1.11).abs() < EPS);
    assert_eq!(m.status(), Phase::Running);

    // 1.24 on the curve, past the 1.20 crash point.
    assert_eq!(m.tick(2_000), Some(1.2));
    assert_eq!(m.status(), Phase::Crashed);
    assert_eq!(m.multiplier(), 1.2);
    assert_eq!(m.balance(), 90.0);
    assert!(m.active_bet().is_none());
    assert_eq!(
        m.sink().last(),
        Some(&RoundEvent::Crashed { round_id: 1, crash_point: 1.2, bet_lost: true })
    );
    assert_eq!(m.history().latest().map(|r| r.crash_point), Some(1.2));
}

#[test]
fn test_cash_out_after_crashing_tick_is_noop() {
    let mut m = linear_machine(&[2.0]);
    m.place_bet(10.0).unwrap();
    m.start_round(0).unwrap();
    assert_eq!(m.tick(4_000), Some(2.0));
    assert_eq!(m.status(), Phase::Crashed);

    assert_eq!(m.cash_out(), None);
    assert_eq!(m.balance(), 90.0);
    assert!(!m
        .sink()
        .iter()
        .any(|event| matches!(event, RoundEvent::CashedOut { .. })));
}

#[test]
fn test_cash_out_uses_last_computed_multiplier() {
    let mut m = linear_machine(&[3.0]);
    m.place_bet(10.0).unwrap();
    m.start_round(0).unwrap();
    m.tick(2_000);
    let settlement = m.cash_out().unwrap();
    assert_eq!(settlement.multiplier, 1.5);
    assert_eq!(m.balance(), 105.0);
}

#[test]
fn test_multiplier_never_decreases_on_stale_timestamps() {
    let mut m = linear_machine(&[3.0]);
    m.start_round(10_000).unwrap();
    assert_eq!(m.tick(14_000), Some(2.0));
    assert_eq!(m.tick(12_000), Some(2.0));
    // Timestamp before the round start reads as zero elapsed.
    assert_eq!(m.tick(5_000), Some(2.0));
    assert_eq!(m.multiplier(), 2.0);
}

#[test]
fn test_bet_rejected_while_cashed_out_round_runs() {
    let mut m = linear_machine(&[3.0]);
    m.place_bet(10.0).unwrap();
    m.start_round(0).unwrap();
    m.tick(1_000);
    m.cash_out().unwrap();
    assert_eq!(
        m.place_bet(10.0),
        Err(crashline_types::GameError::RoundInProgress)
    );
}

#[test]
fn test_intermission_announces_then_starts_next_round() {
    let mut m = linear_machine(&[3.0, 2.0]);
    m.start_round(0).unwrap();
    run_to_crash(&mut m, 8_000);
    assert_eq!(m.next_round_at(), Some(15_000));

    m.sink_mut().clear();
    m.advance(11_999);
    assert!(m.sink().is_empty());
    m.advance(12_000);
    assert_eq!(
        m.sink(),
        &vec![RoundEvent::NextRoundSoon { starts_at_ms: 15_000 }]
    );
    m.advance(14_000);
    assert_eq!(m.sink().len(), 1);

    m.advance(15_000);
    assert_eq!(m.status(), Phase::Running);
    assert_eq!(m.current_round().map(|r| r.id), Some(2));
    assert_eq!(m.next_round_at(), None);
    assert_eq!(
        m.sink().last(),
        Some(&RoundEvent::RoundStarted { round_id: 2, start_time_ms: 15_000 })
    );
}

#[test]
fn test_bet_during_intermission_rides_next_round() {
    let mut m = linear_machine(&[3.0, 2.0]);
    m.start_round(0).unwrap();
    run_to_crash(&mut m, 8_000);

    let bet = m.place_bet(10.0).unwrap();
    assert_eq!(bet.round_id, 2);
    assert_eq!(m.status(), Phase::Pending);
    // The armed start still fires.
    m.advance(15_000);
    assert_eq!(m.status(), Phase::Running);
    assert_eq!(m.active_bet().map(|b| b.round_id), Some(2));
    m.advance(19_000);
    assert_eq!(m.status(), Phase::Crashed);
    assert_eq!(m.balance(), 90.0);
}

#[test]
fn test_cancelled_intermission_never_starts() {
    let mut m = linear_machine(&[3.0]);
    m.start_round(0).unwrap();
    run_to_crash(&mut m, 8_000);
    assert!(m.cancel_schedule());
    m.advance(100_000);
    assert_eq!(m.status(), Phase::Crashed);
    assert_eq!(m.next_round_at(), None);
    assert!(!m.cancel_schedule());
}

#[test]
fn test_schedule_next_from_idle() {
    let mut m = linear_machine(&[3.0]);
    assert_eq!(m.schedule_next(0), Some(7_000));
    assert_eq!(m.next_round_in(2_000), Some(5_000));
    m.advance(6_999);
    assert_eq!(m.status(), Phase::Idle);
    m.advance(7_000);
    assert_eq!(m.status(), Phase::Running);

    assert_eq!(m.schedule_next(7_500), None);
}

#[test]
fn test_history_keeps_ten_most_recent() {
    let mut m = linear_machine(&[1.5]);
    let mut now = 0;
    for _ in 0..25 {
        m.start_round(now).unwrap();
        run_to_crash(&mut m, now + 10_000);
        now += 20_000;
    }
    assert_eq!(m.history().len(), 10);
    let ids: Vec<u64> = m.history().iter().map(|r| r.round_id).collect();
    assert_eq!(ids, (16..=25).rev().collect::<Vec<_>>());
}

#[test]
fn test_configured_history_capacity_bounds_history() {
    let settings = RoundSettings {
        history_capacity: 3,
        ..RoundSettings::default()
    };
    let mut m = scripted_machine(
        settings,
        &[1.2, 1.5, 2.0, 4.0, 6.5],
        Box::new(LinearCurve::new(0.25)),
        100.0,
        Vec::new(),
    );
    let mut now = 0;
    for _ in 0..5 {
        m.start_round(now).unwrap();
        run_to_crash(&mut m, now + 60_000);
        now += 70_000;
    }
    assert_eq!(m.history().len(), 3);
    let ids: Vec<u64> = m.history().iter().map(|r| r.round_id).collect();
    assert_eq!(ids, vec![5, 4, 3]);
    assert_eq!(m.history().crash_points(), vec![6.5, 4.0, 2.0]);
}

#[test]
fn test_crash_reports_exact_crash_point() {
    let mut m = linear_machine(&[2.37]);
    m.start_round(0).unwrap();
    assert_eq!(m.tick(60_000), Some(2.37));
    assert_eq!(m.multiplier(), 2.37);
}

proptest! {
    #[test]
    fn prop_displayed_multiplier_is_monotonic(
        times in proptest::collection::vec(0u64..20_000, 1..50)
    ) {
        let mut m = linear_machine(&[1_000.0]);
        m.start_round(0).unwrap();
        let mut last = 1.0;
        for now in times {
            let value = m.tick(now).unwrap();
            prop_assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn prop_settlement_matches_stake_times_multiplier(
        amount in 3.0f64..100.0,
        cash_at in 0u64..7_999,
    ) {
        let mut m = linear_machine(&[3.0]);
        m.place_bet(amount).unwrap();
        m.start_round(0).unwrap();
        let multiplier = m.tick(cash_at).unwrap();
        let settlement = m.cash_out().unwrap();
        prop_assert_eq!(settlement.multiplier, multiplier);
        let expected = 100.0 - amount + amount * multiplier;
        prop_assert!((m.balance() - expected).abs() < 1e-9);
    }
}
