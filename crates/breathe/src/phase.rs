//! Breathing phases and the transition table
//!
//! A cycle is Inhale -> Hold -> Exhale -> HoldAfterExhale -> Inhale. The two
//! hold phases are elided when the pattern gives them no time, so a pattern
//! never shows a zero-length phase.

use serde::{Deserialize, Serialize};

use crate::pattern::BreathingPattern;

/// One segment of a breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Breathing in, the visual guide expands
    Inhale,
    /// Holding with full lungs
    Hold,
    /// Breathing out, the visual guide contracts
    Exhale,
    /// Holding with empty lungs
    HoldAfterExhale,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::Hold => "hold",
            Phase::Exhale => "exhale",
            Phase::HoldAfterExhale => "hold_after_exhale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inhale" => Some(Phase::Inhale),
            "hold" => Some(Phase::Hold),
            "exhale" => Some(Phase::Exhale),
            "hold_after_exhale" | "holdafterexhale" => Some(Phase::HoldAfterExhale),
            _ => None,
        }
    }

    /// Instruction shown to the person breathing
    pub fn cue(&self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe In",
            Phase::Hold | Phase::HoldAfterExhale => "Hold",
            Phase::Exhale => "Breathe Out",
        }
    }

    /// Phase that follows this one under the given pattern.
    ///
    /// Hold phases with zero duration are skipped.
    pub fn next(self, pattern: &BreathingPattern) -> Phase {
        match self {
            Phase::Inhale if pattern.hold > 0 => Phase::Hold,
            Phase::Inhale | Phase::Hold => Phase::Exhale,
            Phase::Exhale if pattern.hold_after_exhale() > 0 => Phase::HoldAfterExhale,
            Phase::Exhale | Phase::HoldAfterExhale => Phase::Inhale,
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Phase::Inhale,
            Phase::Hold,
            Phase::Exhale,
            Phase::HoldAfterExhale,
        ]
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Inhale
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
