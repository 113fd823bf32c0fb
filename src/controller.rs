//! Front-end side of a session: screens, cursor and the client timers.
//!
//! The controller runs the countdown and starts the response clock when the
//! grid appears. At the deadline it submits a timeout selection, then waits
//! out the cooldown before asking for the next round. Every method takes
//! `now` so tests can drive time by hand.

use std::time::{Duration, Instant};

use crate::config::{ConfigError, RawConfig, SessionConfig};
use crate::engine::{
    EngineError, InvalidState, OutcomeReport, RoundSummary, RoundToken, SessionSummary,
    NO_SELECTION,
};
use crate::service::ReactionTest;
use crate::timers::{TimerKind, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Intro,
    Countdown,
    Playing,
    Cooldown,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug)]
pub struct Controller {
    test: ReactionTest,
    timers: Timers,
    screen: Screen,
    cursor: usize,
    round: Option<RoundToken>,
    opened_at: Option<Instant>,
    last_report: Option<OutcomeReport>,
    summary: Option<SessionSummary>,
}

impl Controller {
    pub fn new(test: ReactionTest) -> Self {
        Self {
            test,
            timers: Timers::new(),
            screen: Screen::Intro,
            cursor: 0,
            round: None,
            opened_at: None,
            last_report: None,
            summary: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn test(&self) -> &ReactionTest {
        &self.test
    }

    pub fn config(&self) -> &SessionConfig {
        self.test.config()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_summary(&self) -> RoundSummary {
        self.test.current_summary()
    }

    pub fn last_report(&self) -> Option<&OutcomeReport> {
        self.last_report.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Installs a settings form and returns to the intro screen.
    pub fn configure(&mut self, raw: &RawConfig) -> Result<(), ConfigError> {
        self.test.configure(raw)?;
        self.back_to_intro();
        Ok(())
    }

    pub fn install(&mut self, config: SessionConfig) {
        self.test.install(config);
        self.back_to_intro();
    }

    /// Starts a new session and runs the countdown for its first round.
    pub fn start(&mut self, now: Instant) -> Result<(), EngineError> {
        self.timers.clear();
        self.last_report = None;
        self.summary = None;
        self.cursor = 0;
        let token = self.test.start_session();
        self.enter_countdown(token, now)
    }

    /// Whole seconds left on the countdown, rounded up.
    pub fn countdown_remaining(&self, now: Instant) -> Option<u64> {
        self.timers
            .remaining(TimerKind::Countdown, now)
            .map(|left| left.as_millis().div_ceil(1000) as u64)
    }

    pub fn deadline_remaining(&self, now: Instant) -> Option<Duration> {
        self.timers.remaining(TimerKind::Deadline, now)
    }

    pub fn move_cursor(&mut self, dir: CursorMove) {
        let cfg = self.test.config();
        let (rows, cols) = (cfg.rows(), cfg.cols());
        let (row, col) = (self.cursor / cols, self.cursor % cols);
        let (row, col) = match dir {
            CursorMove::Left => (row, col.saturating_sub(1)),
            CursorMove::Right => (row, (col + 1).min(cols - 1)),
            CursorMove::Up => (row.saturating_sub(1), col),
            CursorMove::Down => ((row + 1).min(rows - 1), col),
        };
        self.cursor = row * cols + col;
    }

    pub fn select_cursor(&mut self, now: Instant) -> Result<Option<OutcomeReport>, EngineError> {
        self.select(self.cursor, now)
    }

    /// Submits `cell` for the open round. Ignored unless the grid is showing.
    pub fn select(&mut self, cell: usize, now: Instant) -> Result<Option<OutcomeReport>, EngineError> {
        if self.screen != Screen::Playing || cell >= self.test.config().cell_count() {
            return Ok(None);
        }
        self.cursor = cell;
        self.submit(cell as i64, now).map(Some)
    }

    /// Fires whatever timers are due. Returns true when the screen changed.
    pub fn tick(&mut self, now: Instant) -> Result<bool, EngineError> {
        let mut changed = false;
        for expired in self.timers.poll(now) {
            match expired.kind {
                TimerKind::Countdown => {
                    if expired.token == self.round && self.screen == Screen::Countdown {
                        self.open(now)?;
                        changed = true;
                    }
                }
                TimerKind::Deadline => {
                    if self.screen != Screen::Playing || expired.token != self.round {
                        continue;
                    }
                    match self.submit(NO_SELECTION, now) {
                        Ok(_) => changed = true,
                        Err(EngineError::InvalidState(InvalidState::StaleRound { .. })) => {}
                        Err(err) => return Err(err),
                    }
                }
                TimerKind::Cooldown => {
                    if self.screen == Screen::Cooldown {
                        let token = self.test.arm_next_round()?;
                        self.enter_countdown(token, now)?;
                        changed = true;
                    }
                }
            }
        }
        Ok(changed)
    }

    fn back_to_intro(&mut self) {
        self.timers.clear();
        self.screen = Screen::Intro;
        self.cursor = 0;
        self.round = None;
        self.opened_at = None;
        self.last_report = None;
        self.summary = None;
    }

    fn enter_countdown(&mut self, token: RoundToken, now: Instant) -> Result<(), EngineError> {
        self.round = Some(token);
        self.screen = Screen::Countdown;
        let countdown = self.test.config().countdown();
        if countdown.is_zero() {
            self.open(now)
        } else {
            self.timers
                .schedule(TimerKind::Countdown, Some(token), now, countdown);
            Ok(())
        }
    }

    fn open(&mut self, now: Instant) -> Result<(), EngineError> {
        let token = self.test.begin_round()?;
        self.round = Some(token);
        self.opened_at = Some(now);
        self.screen = Screen::Playing;
        let limit = self.test.config().time_limit();
        self.timers
            .schedule(TimerKind::Deadline, Some(token), now, limit);
        Ok(())
    }

    fn submit(&mut self, cell: i64, now: Instant) -> Result<OutcomeReport, EngineError> {
        let token = self.round.ok_or(InvalidState::RoundNotArmed)?;
        let elapsed = self
            .opened_at
            .map(|opened| now.saturating_duration_since(opened).as_secs_f64())
            .unwrap_or_default();

        let report = self.test.submit_outcome_for(token, cell, elapsed)?;
        self.timers.cancel_round(token);
        self.round = None;
        self.opened_at = None;

        if report.session_complete {
            self.timers.clear();
            self.summary = Some(self.test.final_summary()?);
            self.screen = Screen::Complete;
        } else {
            self.screen = Screen::Cooldown;
            let cooldown = self.test.config().cooldown();
            self.timers.schedule(TimerKind::Cooldown, None, now, cooldown);
        }
        self.last_report = Some(report.clone());
        Ok(report)
    }
}
