//! Breathing pattern definitions
//!
//! A pattern is an immutable set of phase durations in whole seconds.
//! Built-in patterns:
//! - **4-7-8**: calming, for anxiety and sleep
//! - **box**: equal timing, for focus and stress relief
//! - **coherent**: 5-5 rhythm, for heart rate variability

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::phase::Phase;

/// Named phase durations for a breathing exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPattern {
    /// Unique pattern identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// What the pattern is for
    #[serde(default)]
    pub description: String,
    /// Seconds breathing in (must be > 0)
    pub inhale: u32,
    /// Seconds holding after the inhale (0 skips the phase)
    #[serde(default)]
    pub hold: u32,
    /// Seconds breathing out (must be > 0)
    pub exhale: u32,
    /// Seconds holding after the exhale (absent or 0 skips the phase)
    #[serde(
        default,
        alias = "holdAfterExhale",
        skip_serializing_if = "Option::is_none"
    )]
    pub hold_after_exhale: Option<u32>,
}

impl BreathingPattern {
    /// Create a pattern with an empty description
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        inhale: u32,
        hold: u32,
        exhale: u32,
        hold_after_exhale: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            inhale,
            hold,
            exhale,
            hold_after_exhale,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check that the pattern can drive an exercise
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.id.trim().is_empty() {
            return Err(PatternError::EmptyId);
        }
        if self.inhale == 0 {
            return Err(PatternError::NoInhale(self.id.clone()));
        }
        if self.exhale == 0 {
            return Err(PatternError::NoExhale(self.id.clone()));
        }
        Ok(())
    }

    /// Hold-after-exhale seconds, with absent treated as zero
    pub fn hold_after_exhale(&self) -> u32 {
        self.hold_after_exhale.unwrap_or(0)
    }

    /// Configured duration of a phase in seconds
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold => self.hold,
            Phase::Exhale => self.exhale,
            Phase::HoldAfterExhale => self.hold_after_exhale(),
        }
    }

    /// Short timing label such as "4-7-8" or "4-4-4-4"
    pub fn timing_label(&self) -> String {
        match self.hold_after_exhale {
            Some(after) if after > 0 => {
                format!("{}-{}-{}-{}", self.inhale, self.hold, self.exhale, after)
            }
            _ => format!("{}-{}-{}", self.inhale, self.hold, self.exhale),
        }
    }

    /// Length of one full cycle in seconds. Summed wide so that any four
    /// `u32` durations fit.
    pub fn cycle_seconds(&self) -> u64 {
        [self.inhale, self.hold, self.exhale, self.hold_after_exhale()]
            .iter()
            .map(|&secs| secs as u64)
            .sum()
    }

    /// Breaths per minute at this pattern's pace
    pub fn breaths_per_minute(&self) -> f64 {
        let total = self.cycle_seconds();
        if total == 0 {
            return 0.0;
        }
        60.0 / total as f64
    }
}

/// Built-in patterns, in display order. The first is the default.
pub fn builtin_patterns() -> Vec<BreathingPattern> {
    vec![
        BreathingPattern::new("4-7-8", "4-7-8 Breathing", 4, 7, 8, None)
            .with_description("Calming technique for anxiety and better sleep"),
        BreathingPattern::new("box", "Box Breathing", 4, 4, 4, Some(4))
            .with_description("Equal timing for focus and stress relief"),
        BreathingPattern::new("coherent", "Coherent Breathing", 5, 0, 5, None)
            .with_description("5-5 rhythm for heart rate variability"),
    ]
}
