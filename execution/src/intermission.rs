//! Cancellable timer between rounds.
//!
//! The intermission is pure: it stores an absolute deadline in milliseconds and answers
//! questions about a caller-supplied `now_ms`, so it can be driven by a real clock or by
//! synthetic timestamps in tests.
//!
//! ```text
//! crash ──► arm(now) ──► [announce window] ──► due ──► start_round
//!            │                                      ▲
//!            └───────────── cancel() ───────────────┘ (never fires)
//! ```

/// Inter-round delay with an optional "next round soon" announcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intermission {
    delay_ms: u64,
    announce_lead_ms: u64,
    starts_at_ms: Option<u64>,
    announced: bool,
}

impl Intermission {
    pub fn new(delay_ms: u64, announce_lead_ms: u64) -> Self {
        Self {
            delay_ms,
            announce_lead_ms: announce_lead_ms.min(delay_ms),
            starts_at_ms: None,
            announced: false,
        }
    }

    /// Arm the timer so the next round starts `delay_ms` after `now_ms`. Re-arming replaces
    /// any pending deadline.
    pub fn arm(&mut self, now_ms: u64) -> u64 {
        let starts_at = now_ms.saturating_add(self.delay_ms);
        self.starts_at_ms = Some(starts_at);
        self.announced = false;
        starts_at
    }

    /// Disarm the timer. Returns whether a start was pending.
    pub fn cancel(&mut self) -> bool {
        self.announced = false;
        self.starts_at_ms.take().is_some()
    }

    pub fn starts_at(&self) -> Option<u64> {
        self.starts_at_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.starts_at_ms.is_some_and(|starts_at| now_ms >= starts_at)
    }

    /// Returns the start time the first time `now_ms` enters the announce window of the
    /// armed deadline, and `None` afterwards.
    pub fn should_announce(&mut self, now_ms: u64) -> Option<u64> {
        let starts_at = self.starts_at_ms?;
        if self.announced || self.announce_lead_ms == 0 {
            return None;
        }
        if now_ms.saturating_add(self.announce_lead_ms) < starts_at {
            return None;
        }
        self.announced = true;
        Some(starts_at)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.starts_at_ms
            .map(|starts_at| starts_at.saturating_sub(now_ms))
    }
}
