//! Guided journaling
//!
//! A fixed set of reflection prompts is cycled through one at a time. Saving
//! an entry moves on to the next prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reflection prompts, in rotation order
pub const PROMPTS: [&str; 8] = [
    "What are three things you're grateful for today?",
    "Describe a moment today when you felt proud of yourself.",
    "What's one challenge you're facing, and how might you approach it?",
    "Write about a person who makes you feel supported and why.",
    "What's something new you learned about yourself recently?",
    "If today had a color, what would it be and why?",
    "What's one small step you can take tomorrow to care for yourself?",
    "Describe a place where you feel most at peace.",
];

const WORDS_PER_MINUTE: usize = 200;

/// Cursor over `PROMPTS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRotator {
    index: usize,
}

impl PromptRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given position. Out-of-range indices wrap.
    pub fn with_index(index: usize) -> Self {
        Self {
            index: index % PROMPTS.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static str {
        PROMPTS[self.index]
    }

    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % PROMPTS.len();
        self.current()
    }
}

/// A saved journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub recorded_at: DateTime<Utc>,
    pub prompt: String,
    pub body: String,
}

/// Journal page being written
#[derive(Debug, Clone, Default)]
pub struct Journal {
    rotator: PromptRotator,
    body: String,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotator(rotator: PromptRotator) -> Self {
        Self {
            rotator,
            body: String::new(),
        }
    }

    pub fn rotator(&self) -> PromptRotator {
        self.rotator
    }

    pub fn prompt(&self) -> &'static str {
        self.rotator.current()
    }

    /// Skip to the next prompt, keeping the body
    pub fn new_prompt(&mut self) -> &'static str {
        self.rotator.advance()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn clear(&mut self) {
        self.body.clear();
    }

    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    /// Estimated minutes to read the body back, never less than one
    pub fn reading_minutes(&self) -> usize {
        let words = self.body.split(' ').count();
        words.div_ceil(WORDS_PER_MINUTE)
    }

    /// Save the body against the current prompt.
    ///
    /// Blank bodies are ignored. On success the body is cleared and the
    /// rotator moves to the next prompt.
    pub fn submit(&mut self) -> Option<JournalEntry> {
        if self.body.trim().is_empty() {
            return None;
        }

        let entry = JournalEntry {
            recorded_at: Utc::now(),
            prompt: self.prompt().to_string(),
            body: std::mem::take(&mut self.body),
        };
        self.rotator.advance();
        Some(entry)
    }
}
