//! The operations a front-end (renderer plus transport) drives.
//!
//! [`ReactionTest`] pairs the installed [`SessionConfig`] with one
//! [`RoundEngine`]. Each handler that owns a session owns one of these.

use crate::config::{ConfigError, RawConfig, SessionConfig};
use crate::engine::{
    EngineError, OutcomeReport, RoundEngine, RoundSummary, RoundToken, SessionSummary,
    TargetSource,
};

#[derive(Debug)]
pub struct ReactionTest {
    engine: RoundEngine,
}

impl ReactionTest {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            engine: RoundEngine::new(config),
        }
    }

    pub fn with_targets(config: SessionConfig, targets: impl TargetSource + 'static) -> Self {
        Self {
            engine: RoundEngine::with_targets(config, targets),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    /// Validates a settings form, installs it and starts a fresh session.
    /// A rejected form leaves both the configuration and the session alone.
    pub fn configure(&mut self, raw: &RawConfig) -> Result<RoundToken, ConfigError> {
        let config = SessionConfig::validate(raw)?;
        Ok(self.install(config))
    }

    pub fn install(&mut self, config: SessionConfig) -> RoundToken {
        self.engine.reset_session(config)
    }

    /// Restarts with the installed configuration.
    pub fn start_session(&mut self) -> RoundToken {
        let config = self.engine.config().clone();
        self.engine.reset_session(config)
    }

    pub fn arm_next_round(&mut self) -> Result<RoundToken, EngineError> {
        self.engine.arm_round()
    }

    /// Opens the armed round once the countdown has run out.
    pub fn begin_round(&mut self) -> Result<RoundToken, EngineError> {
        self.engine.open_round()
    }

    pub fn submit_outcome(
        &mut self,
        selected_cell: i64,
        elapsed_secs: f64,
    ) -> Result<OutcomeReport, EngineError> {
        self.engine.record_outcome(selected_cell, elapsed_secs)
    }

    pub fn submit_outcome_for(
        &mut self,
        token: RoundToken,
        selected_cell: i64,
        elapsed_secs: f64,
    ) -> Result<OutcomeReport, EngineError> {
        self.engine
            .record_outcome_for(token, selected_cell, elapsed_secs)
    }

    pub fn current_summary(&self) -> RoundSummary {
        self.engine.current_summary()
    }

    pub fn final_summary(&self) -> Result<SessionSummary, EngineError> {
        self.engine.final_summary()
    }
}

impl Default for ReactionTest {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
