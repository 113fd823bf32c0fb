// Library surface for headless/integration tests and reuse.
// The terminal front-end in main.rs is the only consumer that renders.
pub mod config;
pub mod controller;
pub mod engine;
pub mod format;
pub mod runtime;
pub mod service;
pub mod timers;
pub mod util;

pub use config::{ConfigError, RawConfig, SessionConfig};
pub use engine::{
    EngineError, InvalidState, OutcomeKind, OutcomeReport, Phase, RoundEngine, RoundSummary,
    RoundToken, SessionSummary,
};
pub use service::ReactionTest;
