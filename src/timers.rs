//! Client-side timers: countdown before a round opens, the response
//! deadline, and the cooldown after a result.
//!
//! The engine never waits on anything. The front-end schedules these
//! against `Instant`s, polls them on every tick and turns expiries into
//! engine calls. Each timer remembers the round token it was scheduled for,
//! so an expiry that outlived its round can be recognised and dropped.

use std::time::{Duration, Instant};

use crate::engine::RoundToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    Countdown,
    Deadline,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub kind: TimerKind,
    pub token: Option<RoundToken>,
    pub due: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    token: Option<RoundToken>,
    due: Instant,
}

/// At most one pending timer per kind; scheduling a kind again replaces it.
#[derive(Debug, Default)]
pub struct Timers {
    pending: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        kind: TimerKind,
        token: Option<RoundToken>,
        now: Instant,
        after: Duration,
    ) {
        self.cancel(kind);
        self.pending.push(Timer {
            kind,
            token,
            due: now + after,
        });
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.kind != kind);
        before != self.pending.len()
    }

    /// Drops every timer scheduled on behalf of `token`'s round.
    pub fn cancel_round(&mut self, token: RoundToken) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.token != Some(token));
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time left on `kind`, zero once due.
    pub fn remaining(&self, kind: TimerKind, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.due.saturating_duration_since(now))
    }

    /// Removes and returns the timers due at `now`, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<Expired> {
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.pending.drain(..).partition(|t| t.due <= now);
        self.pending = pending;

        due.sort_by_key(|t| t.due);
        due.into_iter()
            .map(|t| Expired {
                kind: t.kind,
                token: t.token,
                due: t.due,
            })
            .collect()
    }
}
