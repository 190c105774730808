//! Pattern catalog and breathe settings
//!
//! The catalog is the built-in patterns followed by any user patterns from the
//! `breathe` section of the shared config:
//!
//! ```json
//! {
//!   "breathe": {
//!     "default_pattern": "box",
//!     "tick_policy": "exact",
//!     "patterns": [
//!       { "id": "7-11", "name": "7-11 Breathing", "inhale": 7, "exhale": 11 }
//!     ]
//!   }
//! }
//! ```
//!
//! A user pattern with the id of an existing one replaces it in place.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::engine::TickPolicy;
use crate::error::PatternError;
use crate::pattern::{builtin_patterns, BreathingPattern};

/// Default tick period: one simulated second per real second
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

/// `breathe` section of the shared config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BreatheSettings {
    /// Pattern selected when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pattern: Option<String>,
    /// How countdowns cross phase boundaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_policy: Option<TickPolicy>,
    /// Real milliseconds between ticks of a live exercise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_millis: Option<u64>,
    /// Extra or overriding patterns
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<BreathingPattern>,
}

impl BreatheSettings {
    pub fn tick_policy(&self) -> TickPolicy {
        self.tick_policy.unwrap_or_default()
    }

    /// Tick period for live exercises, never shorter than one millisecond
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.unwrap_or(DEFAULT_TICK_MILLIS).max(1))
    }
}

/// Ordered set of selectable patterns. Never empty.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<BreathingPattern>,
    default_id: Option<String>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternCatalog {
    /// Catalog of the built-in patterns only
    pub fn builtin() -> Self {
        Self {
            patterns: builtin_patterns(),
            default_id: None,
        }
    }

    /// Built-in patterns merged with the user's settings
    pub fn from_settings(settings: &BreatheSettings) -> Result<Self, PatternError> {
        let mut catalog = Self::builtin();

        for pattern in &settings.patterns {
            pattern.validate()?;
            catalog.upsert(pattern.clone());
        }

        if let Some(id) = &settings.default_pattern {
            catalog.require(id)?;
            catalog.default_id = Some(id.clone());
        }

        Ok(catalog)
    }

    fn upsert(&mut self, pattern: BreathingPattern) {
        match self.patterns.iter_mut().find(|p| p.id == pattern.id) {
            Some(existing) => {
                debug!(pattern = %pattern.id, "Overriding pattern from config");
                *existing = pattern;
            }
            None => {
                debug!(pattern = %pattern.id, "Adding pattern from config");
                self.patterns.push(pattern);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&BreathingPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Look up a pattern, treating a missing id as a configuration error
    pub fn require(&self, id: &str) -> Result<&BreathingPattern, PatternError> {
        self.get(id)
            .ok_or_else(|| PatternError::UnknownPattern(id.to_string()))
    }

    /// Configured default, or the first pattern
    pub fn default_pattern(&self) -> &BreathingPattern {
        self.default_id
            .as_deref()
            .and_then(|id| self.get(id))
            .unwrap_or(&self.patterns[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreathingPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
