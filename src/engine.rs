//! Round and session state machine.
//!
//! A [`RoundEngine`] owns one session: it draws the target for each round,
//! classifies the submitted selection and keeps score. It never measures
//! time itself; elapsed times are whatever the caller reports.
//!
//! ```text
//! Idle ──reset──▶ Armed ──open──▶ Active ──record──▶ RoundComplete ──arm──▶ Armed
//!                   │                                      │
//!                   └────────────record────────────────────┤
//!                                                          ▼
//!                                   (round_index == rounds_to_win) SessionComplete
//! ```

use chrono::{DateTime, Local};
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::config::SessionConfig;
use crate::format::{outcome_line, score_line, status_line};
use crate::util::{fastest, mean, std_dev};

/// Selection value meaning "nothing was picked before the deadline".
pub const NO_SELECTION: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Armed,
    Active,
    RoundComplete,
    SessionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Correct,
    Wrong,
    Timeout,
}

impl OutcomeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Correct => "✅",
            Self::Wrong => "❌",
            Self::Timeout => "⏰",
        }
    }
}

/// Classification order matters: a hit on the target counts as correct no
/// matter how late it arrived.
pub fn classify(selected_cell: i64, target: usize) -> OutcomeKind {
    if usize::try_from(selected_cell).ok() == Some(target) {
        OutcomeKind::Correct
    } else if selected_cell == NO_SELECTION {
        OutcomeKind::Timeout
    } else {
        OutcomeKind::Wrong
    }
}

/// Identifies one armed round. Tokens increase monotonically for the life of
/// an engine, across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoundToken(u64);

impl RoundToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoundToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Picks the target cell for each round.
pub trait TargetSource: fmt::Debug + Send {
    /// Returns a cell index in `0..cell_count`.
    fn next_target(&mut self, cell_count: usize) -> usize;
}

#[derive(Debug)]
pub struct RandomTargets {
    rng: StdRng,
}

impl RandomTargets {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTargets {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetSource for RandomTargets {
    fn next_target(&mut self, cell_count: usize) -> usize {
        self.rng.gen_range(0..cell_count)
    }
}

/// Replays a fixed list of targets, repeating the last one once exhausted.
/// Values are wrapped into the grid.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTargets {
    queue: VecDeque<usize>,
    last: usize,
}

impl ScriptedTargets {
    pub fn new(targets: impl IntoIterator<Item = usize>) -> Self {
        Self {
            queue: targets.into_iter().collect(),
            last: 0,
        }
    }
}

impl TargetSource for ScriptedTargets {
    fn next_target(&mut self, cell_count: usize) -> usize {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last % cell_count
    }
}

/// One completed round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub kind: OutcomeKind,
    pub selected_cell: i64,
    pub target: usize,
    pub elapsed_secs: f64,
    pub recorded_at: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub round_index: u32,
    pub success_count: u32,
    pub target: Option<usize>,
    pub last_result: String,
    pub history: Vec<String>,
    pub rounds: Vec<RoundRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub kind: OutcomeKind,
    pub elapsed_secs: f64,
    pub round_index: u32,
    pub success_count: u32,
    pub session_complete: bool,
    /// The line appended to the history for this round.
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round_index: u32,
    pub rounds_to_win: u32,
    pub success_count: u32,
    pub last_result: String,
}

impl RoundSummary {
    pub fn status_line(&self) -> String {
        status_line(self.round_index, self.rounds_to_win, self.success_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub success_count: u32,
    pub rounds_to_win: u32,
    pub history: Vec<String>,
    /// Statistics over the correct rounds only; `None` when there were none.
    pub mean_correct_secs: Option<f64>,
    pub std_dev_correct_secs: Option<f64>,
    pub fastest_correct_secs: Option<f64>,
}

impl SessionSummary {
    pub fn score_line(&self) -> String {
        score_line(self.success_count, self.rounds_to_win)
    }

    pub fn history_text(&self) -> String {
        self.history.iter().join("\n")
    }
}

/// Why an operation was refused in the engine's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidState {
    NotStarted,
    SessionComplete,
    SessionInProgress,
    RoundNotArmed,
    RoundInProgress,
    StaleRound {
        expected: Option<RoundToken>,
        got: RoundToken,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    InvalidState(InvalidState),
}

impl From<InvalidState> for EngineError {
    fn from(state: InvalidState) -> Self {
        Self::InvalidState(state)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::InvalidState(state) = self;
        match state {
            InvalidState::NotStarted => write!(f, "No session has been started"),
            InvalidState::SessionComplete => write!(f, "Session is already complete"),
            InvalidState::SessionInProgress => write!(f, "Session is still in progress"),
            InvalidState::RoundNotArmed => write!(f, "No round is armed"),
            InvalidState::RoundInProgress => write!(f, "Round is already in progress"),
            InvalidState::StaleRound {
                expected: Some(expected),
                got,
            } => write!(f, "Stale round {}, current round is {}", got, expected),
            InvalidState::StaleRound {
                expected: None,
                got,
            } => write!(f, "Stale round {}, no round is armed", got),
        }
    }
}

impl std::error::Error for EngineError {}

#[derive(Debug)]
pub struct RoundEngine {
    config: SessionConfig,
    state: SessionState,
    phase: Phase,
    targets: Box<dyn TargetSource>,
    round_token: Option<RoundToken>,
    tokens_issued: u64,
}

impl RoundEngine {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_targets(config, RandomTargets::new())
    }

    pub fn with_targets(config: SessionConfig, targets: impl TargetSource + 'static) -> Self {
        Self {
            config,
            state: SessionState::default(),
            phase: Phase::Idle,
            targets: Box::new(targets),
            round_token: None,
            tokens_issued: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<usize> {
        self.state.target
    }

    pub fn round_token(&self) -> Option<RoundToken> {
        self.round_token
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.state.rounds
    }

    pub fn is_complete(&self) -> bool {
        self.state.round_index == self.config.rounds_to_win()
    }

    /// Starts over with `config`, discarding whatever session was running,
    /// and arms the first round.
    pub fn reset_session(&mut self, config: SessionConfig) -> RoundToken {
        self.config = config;
        self.state = SessionState::default();
        self.arm()
    }

    /// Draws the next round's target. Calling it again before the armed
    /// round is opened or answered returns the same token without redrawing.
    pub fn arm_round(&mut self) -> Result<RoundToken, EngineError> {
        match self.phase {
            Phase::Idle => Err(InvalidState::NotStarted.into()),
            Phase::Armed => self
                .round_token
                .ok_or(InvalidState::RoundNotArmed.into()),
            Phase::Active => Err(InvalidState::RoundInProgress.into()),
            Phase::RoundComplete => Ok(self.arm()),
            Phase::SessionComplete => Err(InvalidState::SessionComplete.into()),
        }
    }

    /// Opens the response window of the armed round.
    pub fn open_round(&mut self) -> Result<RoundToken, EngineError> {
        match (self.phase, self.round_token) {
            (Phase::Armed, Some(token)) => {
                self.phase = Phase::Active;
                Ok(token)
            }
            (Phase::Idle, _) => Err(InvalidState::NotStarted.into()),
            (Phase::Active, _) => Err(InvalidState::RoundInProgress.into()),
            (Phase::SessionComplete, _) => Err(InvalidState::SessionComplete.into()),
            _ => Err(InvalidState::RoundNotArmed.into()),
        }
    }

    /// Classifies `selected_cell` against the armed target and books the
    /// round. `NO_SELECTION` marks a timeout.
    pub fn record_outcome(
        &mut self,
        selected_cell: i64,
        elapsed_secs: f64,
    ) -> Result<OutcomeReport, EngineError> {
        match self.phase {
            Phase::Armed | Phase::Active => {}
            Phase::Idle => return Err(InvalidState::NotStarted.into()),
            Phase::RoundComplete => return Err(InvalidState::RoundNotArmed.into()),
            Phase::SessionComplete => return Err(InvalidState::SessionComplete.into()),
        }
        let Some(target) = self.state.target.take() else {
            return Err(InvalidState::RoundNotArmed.into());
        };

        let kind = classify(selected_cell, target);
        let result = outcome_line(kind, elapsed_secs);

        self.state.round_index += 1;
        if kind == OutcomeKind::Correct {
            self.state.success_count += 1;
        }
        self.state.last_result = result.clone();
        self.state.history.push(result.clone());
        self.state.rounds.push(RoundRecord {
            kind,
            selected_cell,
            target,
            elapsed_secs,
            recorded_at: Local::now(),
        });
        self.round_token = None;

        let session_complete = self.is_complete();
        self.phase = if session_complete {
            Phase::SessionComplete
        } else {
            Phase::RoundComplete
        };

        Ok(OutcomeReport {
            kind,
            elapsed_secs,
            round_index: self.state.round_index,
            success_count: self.state.success_count,
            session_complete,
            result,
        })
    }

    /// Like [`RoundEngine::record_outcome`], but only for the round `token`
    /// was issued for. Late or duplicate submissions are refused.
    pub fn record_outcome_for(
        &mut self,
        token: RoundToken,
        selected_cell: i64,
        elapsed_secs: f64,
    ) -> Result<OutcomeReport, EngineError> {
        if self.phase == Phase::SessionComplete {
            return Err(InvalidState::SessionComplete.into());
        }
        if self.round_token != Some(token) {
            return Err(InvalidState::StaleRound {
                expected: self.round_token,
                got: token,
            }
            .into());
        }
        self.record_outcome(selected_cell, elapsed_secs)
    }

    pub fn current_summary(&self) -> RoundSummary {
        RoundSummary {
            round_index: self.state.round_index,
            rounds_to_win: self.config.rounds_to_win(),
            success_count: self.state.success_count,
            last_result: self.state.last_result.clone(),
        }
    }

    pub fn final_summary(&self) -> Result<SessionSummary, EngineError> {
        if self.phase != Phase::SessionComplete {
            return Err(match self.phase {
                Phase::Idle => InvalidState::NotStarted,
                _ => InvalidState::SessionInProgress,
            }
            .into());
        }

        let correct_times: Vec<f64> = self
            .state
            .rounds
            .iter()
            .filter(|r| r.kind == OutcomeKind::Correct)
            .map(|r| r.elapsed_secs)
            .collect();

        Ok(SessionSummary {
            success_count: self.state.success_count,
            rounds_to_win: self.config.rounds_to_win(),
            history: self.state.history.clone(),
            mean_correct_secs: mean(&correct_times),
            std_dev_correct_secs: std_dev(&correct_times),
            fastest_correct_secs: fastest(&correct_times),
        })
    }

    fn arm(&mut self) -> RoundToken {
        let target = self.targets.next_target(self.config.cell_count());
        self.state.target = Some(target);
        self.state.last_result.clear();
        self.phase = Phase::Armed;

        self.tokens_issued += 1;
        let token = RoundToken(self.tokens_issued);
        self.round_token = Some(token);
        token
    }
}
