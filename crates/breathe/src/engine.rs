//! Breathing phase engine
//!
//! The engine is a pure reducer: `EngineState::apply` takes a command and
//! returns the next state. Nothing is captured between calls, so a tick always
//! sees the pattern and phase that are current at the moment it is applied.
//!
//! Time only moves through `Command::Tick`, one simulated second per call.
//! The engine never schedules anything itself; see `pacer` for the timer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatternError;
use crate::pattern::BreathingPattern;
use crate::phase::Phase;

/// How a countdown crosses a phase boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickPolicy {
    /// A phase of N seconds lasts exactly N ticks; the countdown never shows 0
    Exact,
    /// The countdown rests on 0 for one tick before the phase changes,
    /// so a phase of N seconds lasts N + 1 ticks
    Linger,
}

impl TickPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickPolicy::Exact => "exact",
            TickPolicy::Linger => "linger",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(TickPolicy::Exact),
            "linger" => Some(TickPolicy::Linger),
            _ => None,
        }
    }

    /// Parse a policy name, reporting unknown names as configuration errors
    pub fn parse(s: &str) -> Result<Self, PatternError> {
        Self::from_str(s).ok_or_else(|| PatternError::UnknownTickPolicy(s.to_string()))
    }

    /// Lowest countdown value that still decrements instead of advancing
    fn floor(&self) -> u32 {
        match self {
            TickPolicy::Exact => 1,
            TickPolicy::Linger => 0,
        }
    }
}

impl Default for TickPolicy {
    fn default() -> Self {
        TickPolicy::Exact
    }
}

impl std::fmt::Display for TickPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input to the engine reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the pattern and return to a stopped, fresh Inhale
    SelectPattern(BreathingPattern),
    /// Begin or resume advancing on ticks
    Start,
    /// Stop advancing on ticks, keeping the countdown
    Pause,
    /// Stop and return to a fresh Inhale of the current pattern
    Reset,
    /// One simulated second
    Tick,
}

/// Runtime state of one breathing exercise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pattern: BreathingPattern,
    policy: TickPolicy,
    running: bool,
    phase: Phase,
    seconds_remaining: u32,
    completed_cycles: u64,
}

impl EngineState {
    /// Fresh, stopped state at the start of the pattern's Inhale
    pub fn new(pattern: BreathingPattern, policy: TickPolicy) -> Result<Self, PatternError> {
        pattern.validate()?;
        Ok(Self {
            seconds_remaining: pattern.inhale,
            pattern,
            policy,
            running: false,
            phase: Phase::Inhale,
            completed_cycles: 0,
        })
    }

    /// Compute the state that follows `command`.
    ///
    /// Only `SelectPattern` can fail, and only for an invalid pattern.
    pub fn apply(&self, command: Command) -> Result<Self, PatternError> {
        let mut next = self.clone();
        next.step(command)?;
        Ok(next)
    }

    /// Apply a command in place, returning the phase entered by a tick.
    /// On error the state is left untouched.
    pub(crate) fn step(&mut self, command: Command) -> Result<Option<Phase>, PatternError> {
        match command {
            Command::SelectPattern(pattern) => {
                pattern.validate()?;
                self.pattern = pattern;
                self.rewind();
                Ok(None)
            }
            Command::Start => {
                self.running = true;
                Ok(None)
            }
            Command::Pause => {
                self.running = false;
                Ok(None)
            }
            Command::Reset => {
                self.rewind();
                Ok(None)
            }
            Command::Tick => Ok(self.tick()),
        }
    }

    fn rewind(&mut self) {
        self.running = false;
        self.phase = Phase::Inhale;
        self.seconds_remaining = self.pattern.inhale;
        self.completed_cycles = 0;
    }

    fn tick(&mut self) -> Option<Phase> {
        if !self.running {
            return None;
        }

        if self.seconds_remaining > self.policy.floor() {
            self.seconds_remaining -= 1;
            return None;
        }

        let next = self.phase.next(&self.pattern);
        if next == Phase::Inhale {
            self.completed_cycles += 1;
        }
        self.phase = next;
        self.seconds_remaining = self.pattern.duration_of(next);
        Some(next)
    }

    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    pub fn policy(&self) -> TickPolicy {
        self.policy
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    /// Number of times the cycle has wrapped back into Inhale.
    ///
    /// The opening Inhale of a session is not counted.
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }

    /// Configured length of the current phase
    pub fn phase_duration(&self) -> u32 {
        self.pattern.duration_of(self.phase)
    }

    /// Fraction of the current phase already elapsed, in [0, 1]
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.seconds_remaining);
        elapsed as f64 / total as f64
    }

    /// Size of the visual guide: grows 0.5 -> 1.0 on the inhale, rests at
    /// 1.0 on either hold, shrinks 1.0 -> 0.5 on the exhale
    pub fn scale(&self) -> f64 {
        let progress = self.progress();
        match self.phase {
            Phase::Inhale => 0.5 + progress * 0.5,
            Phase::Hold | Phase::HoldAfterExhale => 1.0,
            Phase::Exhale => 1.0 - progress * 0.5,
        }
    }

    /// Read-only copy of the state for display and serialization
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pattern_id: self.pattern.id.clone(),
            phase: self.phase,
            cue: self.phase.cue().to_string(),
            seconds_remaining: self.seconds_remaining,
            completed_cycles: self.completed_cycles,
            running: self.running,
            progress: self.progress(),
            scale: self.scale(),
        }
    }
}

/// Point-in-time view of an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pattern_id: String,
    pub phase: Phase,
    pub cue: String,
    pub seconds_remaining: u32,
    pub completed_cycles: u64,
    pub running: bool,
    pub progress: f64,
    pub scale: f64,
}

/// Owner of one exercise's state, exposing the named operations
#[derive(Debug, Clone)]
pub struct BreathingEngine {
    state: EngineState,
}

impl BreathingEngine {
    /// Create an engine for a pattern using the default tick policy
    pub fn new(pattern: BreathingPattern) -> Result<Self, PatternError> {
        Self::with_policy(pattern, TickPolicy::default())
    }

    pub fn with_policy(pattern: BreathingPattern, policy: TickPolicy) -> Result<Self, PatternError> {
        Ok(Self {
            state: EngineState::new(pattern, policy)?,
        })
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Apply any command, returning the phase entered if a tick crossed a
    /// phase boundary
    pub fn dispatch(&mut self, command: Command) -> Result<Option<Phase>, PatternError> {
        let label = command_label(&command);
        let is_tick = matches!(command, Command::Tick);
        let entered = self.state.step(command)?;

        match entered {
            Some(phase) => debug!(
                pattern = %self.state.pattern.id,
                phase = %phase,
                seconds = self.state.seconds_remaining,
                cycles = self.state.completed_cycles,
                "Entered phase"
            ),
            None if !is_tick => debug!(
                pattern = %self.state.pattern.id,
                command = label,
                running = self.state.running,
                "Applied command"
            ),
            None => {}
        }

        Ok(entered)
    }

    /// Switch pattern; stops the exercise and starts over on the new pattern
    pub fn select_pattern(&mut self, pattern: BreathingPattern) -> Result<(), PatternError> {
        self.dispatch(Command::SelectPattern(pattern)).map(|_| ())
    }

    pub fn start(&mut self) {
        self.infallible(Command::Start);
    }

    pub fn pause(&mut self) {
        self.infallible(Command::Pause);
    }

    pub fn reset(&mut self) {
        self.infallible(Command::Reset);
    }

    /// Advance one simulated second
    pub fn tick(&mut self) -> Option<Phase> {
        self.infallible(Command::Tick)
    }

    fn infallible(&mut self, command: Command) -> Option<Phase> {
        // Only pattern selection validates input
        self.dispatch(command).unwrap_or(None)
    }
}

fn command_label(command: &Command) -> &'static str {
    match command {
        Command::SelectPattern(_) => "select_pattern",
        Command::Start => "start",
        Command::Pause => "pause",
        Command::Reset => "reset",
        Command::Tick => "tick",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::builtin_patterns;

    fn four_seven_eight() -> BreathingPattern {
        BreathingPattern::new("4-7-8", "4-7-8 Breathing", 4, 7, 8, None)
    }

    fn box_pattern() -> BreathingPattern {
        BreathingPattern::new("box", "Box Breathing", 4, 4, 4, Some(4))
    }

    fn running(pattern: BreathingPattern) -> BreathingEngine {
        let mut engine = BreathingEngine::new(pattern).unwrap();
        engine.start();
        engine
    }

    fn ticks(engine: &mut BreathingEngine, n: usize) {
        for _ in 0..n {
            engine.tick();
        }
    }

    #[test]
    fn test_initial_state() {
        let engine = BreathingEngine::new(four_seven_eight()).unwrap();
        let state = engine.state();
        assert!(!state.is_running());
        assert_eq!(state.phase(), Phase::Inhale);
        assert_eq!(state.seconds_remaining(), 4);
        assert_eq!(state.completed_cycles(), 0);
        assert_eq!(state.policy(), TickPolicy::Exact);
    }

    #[test]
    fn test_invalid_pattern_rejected_on_create() {
        let bad = BreathingPattern::new("bad", "Bad", 0, 1, 1, None);
        assert!(matches!(
            BreathingEngine::new(bad),
            Err(PatternError::NoInhale(_))
        ));
    }

    #[test]
    fn test_two_phase_cycle_when_holds_are_zero() {
        for (inhale, exhale) in [(1, 1), (1, 3), (2, 7), (5, 5), (6, 2)] {
            for after in [None, Some(0)] {
                let pattern = BreathingPattern::new("two", "Two", inhale, 0, exhale, after);
                let mut engine = running(pattern);
                let cycle = (inhale + exhale) as usize;

                let mut entered = Vec::new();
                for _ in 0..cycle * 4 {
                    if let Some(phase) = engine.tick() {
                        entered.push(phase);
                    }
                }

                assert_eq!(entered.len(), 8, "pattern {}-0-{}", inhale, exhale);
                for (i, phase) in entered.iter().enumerate() {
                    let expected = if i % 2 == 0 { Phase::Exhale } else { Phase::Inhale };
                    assert_eq!(*phase, expected, "pattern {}-0-{}", inhale, exhale);
                }
                assert_eq!(engine.state().completed_cycles(), 4);
                assert_eq!(engine.state().phase(), Phase::Inhale);
                assert_eq!(engine.state().seconds_remaining(), inhale);
            }
        }
    }

    #[test]
    fn test_four_seven_eight_cycle_is_nineteen_ticks() {
        let mut engine = running(four_seven_eight());
        ticks(&mut engine, 18);
        assert_eq!(engine.state().completed_cycles(), 0);
        assert_eq!(engine.state().phase(), Phase::Exhale);
        assert_eq!(engine.state().seconds_remaining(), 1);

        engine.tick();
        let state = engine.state();
        assert_eq!(state.completed_cycles(), 1);
        assert_eq!(state.phase(), Phase::Inhale);
        assert_eq!(state.seconds_remaining(), 4);
    }

    #[test]
    fn test_box_period_holds_for_hundred_cycles() {
        let mut engine = running(box_pattern());
        for cycle in 1..=100u64 {
            ticks(&mut engine, 15);
            assert_eq!(engine.state().completed_cycles(), cycle - 1);
            engine.tick();
            assert_eq!(engine.state().completed_cycles(), cycle);
            assert_eq!(engine.state().phase(), Phase::Inhale);
            assert_eq!(engine.state().seconds_remaining(), 4);
        }
    }

    #[test]
    fn test_exact_policy_never_shows_zero() {
        let mut engine = running(box_pattern());
        for _ in 0..64 {
            engine.tick();
            assert!(engine.state().seconds_remaining() >= 1);
        }
    }

    #[test]
    fn test_linger_policy_rests_on_zero() {
        let mut engine =
            BreathingEngine::with_policy(four_seven_eight(), TickPolicy::Linger).unwrap();
        engine.start();

        ticks(&mut engine, 4);
        assert_eq!(engine.state().phase(), Phase::Inhale);
        assert_eq!(engine.state().seconds_remaining(), 0);

        assert_eq!(engine.tick(), Some(Phase::Hold));
        assert_eq!(engine.state().seconds_remaining(), 7);

        // 4+1 + 7+1 + 8+1 ticks per cycle
        ticks(&mut engine, 16);
        assert_eq!(engine.state().completed_cycles(), 0);
        assert_eq!(engine.tick(), Some(Phase::Inhale));
        assert_eq!(engine.state().completed_cycles(), 1);
        assert_eq!(engine.state().seconds_remaining(), 4);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut engine = running(box_pattern());
        ticks(&mut engine, 6);
        let before = engine.state().clone();

        engine.pause();
        engine.pause();
        ticks(&mut engine, 50);
        let mut paused = before.clone();
        paused.running = false;
        assert_eq!(engine.state(), &paused);

        engine.start();
        engine.start();
        ticks(&mut engine, 10);

        let mut uninterrupted = running(box_pattern());
        ticks(&mut uninterrupted, 16);
        assert_eq!(engine.state(), uninterrupted.state());
    }

    #[test]
    fn test_stopped_engine_ignores_ticks() {
        let mut engine = BreathingEngine::new(box_pattern()).unwrap();
        let before = engine.state().clone();
        ticks(&mut engine, 10);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_reset_from_any_state() {
        for n in [0usize, 3, 4, 9, 17, 40] {
            let mut engine = running(four_seven_eight());
            ticks(&mut engine, n);
            engine.reset();
            let state = engine.state();
            assert!(!state.is_running());
            assert_eq!(state.phase(), Phase::Inhale);
            assert_eq!(state.seconds_remaining(), 4);
            assert_eq!(state.completed_cycles(), 0);
            assert_eq!(state.pattern().id, "4-7-8");
        }
    }

    #[test]
    fn test_select_pattern_mid_run_starts_over() {
        let mut engine = running(four_seven_eight());
        ticks(&mut engine, 30);

        let coherent = BreathingPattern::new("coherent", "Coherent", 5, 0, 5, None);
        engine.select_pattern(coherent).unwrap();
        let state = engine.state();
        assert!(!state.is_running());
        assert_eq!(state.pattern().id, "coherent");
        assert_eq!(state.phase(), Phase::Inhale);
        assert_eq!(state.seconds_remaining(), 5);
        assert_eq!(state.completed_cycles(), 0);

        engine.start();
        for _ in 0..30 {
            engine.tick();
            assert!(engine.state().seconds_remaining() <= 5);
            assert_ne!(engine.state().phase(), Phase::Hold);
        }
    }

    #[test]
    fn test_rejected_pattern_leaves_state_untouched() {
        let mut engine = running(box_pattern());
        ticks(&mut engine, 5);
        let before = engine.state().clone();

        let bad = BreathingPattern::new("flat", "Flat", 4, 0, 0, None);
        assert_eq!(
            engine.select_pattern(bad),
            Err(PatternError::NoExhale("flat".into()))
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_reducer_does_not_mutate_input() {
        let state = EngineState::new(box_pattern(), TickPolicy::Exact).unwrap();
        let started = state.apply(Command::Start).unwrap();
        let ticked = started.apply(Command::Tick).unwrap();

        assert!(!state.is_running());
        assert_eq!(started.seconds_remaining(), 4);
        assert_eq!(ticked.seconds_remaining(), 3);
    }

    #[test]
    fn test_progress_and_scale() {
        let mut engine = running(box_pattern());
        assert_eq!(engine.state().progress(), 0.0);
        assert_eq!(engine.state().scale(), 0.5);

        ticks(&mut engine, 2);
        assert_eq!(engine.state().progress(), 0.5);
        assert_eq!(engine.state().scale(), 0.75);

        ticks(&mut engine, 2);
        assert_eq!(engine.state().phase(), Phase::Hold);
        assert_eq!(engine.state().scale(), 1.0);

        ticks(&mut engine, 4);
        assert_eq!(engine.state().phase(), Phase::Exhale);
        assert_eq!(engine.state().scale(), 1.0);
        ticks(&mut engine, 2);
        assert_eq!(engine.state().scale(), 0.75);

        ticks(&mut engine, 2);
        assert_eq!(engine.state().phase(), Phase::HoldAfterExhale);
        assert_eq!(engine.state().scale(), 1.0);
    }

    #[test]
    fn test_linger_progress_reaches_one() {
        let mut engine =
            BreathingEngine::with_policy(four_seven_eight(), TickPolicy::Linger).unwrap();
        engine.start();
        ticks(&mut engine, 4);
        assert_eq!(engine.state().progress(), 1.0);
        assert_eq!(engine.state().scale(), 1.0);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut engine = running(builtin_patterns()[1].clone());
        ticks(&mut engine, 5);
        let snap = engine.snapshot();
        assert_eq!(snap.pattern_id, "box");
        assert_eq!(snap.phase, Phase::Hold);
        assert_eq!(snap.cue, "Hold");
        assert_eq!(snap.seconds_remaining, 3);
        assert!(snap.running);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "hold");
    }

    #[test]
    fn test_tick_policy_parse() {
        assert_eq!(TickPolicy::parse("EXACT").unwrap(), TickPolicy::Exact);
        assert_eq!(TickPolicy::parse("linger").unwrap(), TickPolicy::Linger);
        assert_eq!(
            TickPolicy::parse("lazy"),
            Err(PatternError::UnknownTickPolicy("lazy".into()))
        );
    }
}
