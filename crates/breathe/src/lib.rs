//! breathe - Guided breathing exercises
//!
//! "Slow the breath, slow the mind."
//!
//! The core is a small deterministic state machine: a pattern of phase
//! durations (inhale, hold, exhale, hold after exhale) counted down one
//! simulated second per tick. Everything else drives or displays it:
//! - Pattern catalog: built-in patterns plus user patterns from config
//! - Engine: a pure reducer over (state, command) -> state
//! - Pacer: the async one-second scheduler that ticks the engine while running
//!
//! Commands:
//! - list: Show available patterns
//! - show ID: Show one pattern's timings
//! - run: Guide a live exercise in the terminal
//! - simulate: Print a deterministic tick trace

pub mod catalog;
pub mod engine;
pub mod error;
pub mod pacer;
pub mod pattern;
pub mod phase;

pub use catalog::{BreatheSettings, PatternCatalog};
pub use engine::{BreathingEngine, Command, EngineState, Snapshot, TickPolicy};
pub use error::PatternError;
pub use pacer::{Pacer, PacerError, PacerHandle};
pub use pattern::BreathingPattern;
pub use phase::Phase;
