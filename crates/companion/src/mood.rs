//! Mood tracking
//!
//! A mood check-in is a level on a five-point scale, any number of emotion
//! tags, and an optional note. The draft only becomes an entry once a level
//! has been picked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mood scale, stored as its score on a 1-10 axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MoodLevel {
    VeryLow,
    Low,
    Neutral,
    Good,
    Excellent,
}

impl MoodLevel {
    pub fn score(&self) -> u8 {
        match self {
            MoodLevel::VeryLow => 1,
            MoodLevel::Low => 3,
            MoodLevel::Neutral => 5,
            MoodLevel::Good => 7,
            MoodLevel::Excellent => 9,
        }
    }

    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1 => Some(MoodLevel::VeryLow),
            3 => Some(MoodLevel::Low),
            5 => Some(MoodLevel::Neutral),
            7 => Some(MoodLevel::Good),
            9 => Some(MoodLevel::Excellent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::VeryLow => "Very Low",
            MoodLevel::Low => "Low",
            MoodLevel::Neutral => "Neutral",
            MoodLevel::Good => "Good",
            MoodLevel::Excellent => "Excellent",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            MoodLevel::VeryLow,
            MoodLevel::Low,
            MoodLevel::Neutral,
            MoodLevel::Good,
            MoodLevel::Excellent,
        ]
    }
}

impl TryFrom<u8> for MoodLevel {
    type Error = String;

    fn try_from(score: u8) -> Result<Self, Self::Error> {
        Self::from_score(score)
            .ok_or_else(|| format!("Invalid mood score {} (expected 1, 3, 5, 7, or 9)", score))
    }
}

impl From<MoodLevel> for u8 {
    fn from(level: MoodLevel) -> Self {
        level.score()
    }
}

impl std::fmt::Display for MoodLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Emotion tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Grateful,
    Energetic,
    Calm,
    Anxious,
    Sad,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Grateful => "grateful",
            Emotion::Energetic => "energetic",
            Emotion::Calm => "calm",
            Emotion::Anxious => "anxious",
            Emotion::Sad => "sad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Some(Emotion::Happy),
            "grateful" => Some(Emotion::Grateful),
            "energetic" => Some(Emotion::Energetic),
            "calm" => Some(Emotion::Calm),
            "anxious" => Some(Emotion::Anxious),
            "sad" => Some(Emotion::Sad),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Grateful => "Grateful",
            Emotion::Energetic => "Energetic",
            Emotion::Calm => "Calm",
            Emotion::Anxious => "Anxious",
            Emotion::Sad => "Sad",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Emotion::Happy,
            Emotion::Grateful,
            Emotion::Energetic,
            Emotion::Calm,
            Emotion::Anxious,
            Emotion::Sad,
        ]
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A submitted mood check-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub recorded_at: DateTime<Utc>,
    pub mood: MoodLevel,
    #[serde(default)]
    pub emotions: Vec<Emotion>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Mood check-in being filled in
#[derive(Debug, Clone, Default)]
pub struct MoodDraft {
    mood: Option<MoodLevel>,
    emotions: Vec<Emotion>,
    note: String,
}

impl MoodDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, level: MoodLevel) {
        self.mood = Some(level);
    }

    /// Add the emotion if absent, remove it if present. Order of first
    /// selection is kept.
    pub fn toggle(&mut self, emotion: Emotion) {
        match self.emotions.iter().position(|e| *e == emotion) {
            Some(index) => {
                self.emotions.remove(index);
            }
            None => self.emotions.push(emotion),
        }
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn mood(&self) -> Option<MoodLevel> {
        self.mood
    }

    pub fn emotions(&self) -> &[Emotion] {
        &self.emotions
    }

    pub fn can_submit(&self) -> bool {
        self.mood.is_some()
    }

    /// Turn the draft into an entry and clear it.
    ///
    /// Returns None, leaving the draft as is, when no level was selected.
    pub fn submit(&mut self) -> Option<MoodEntry> {
        let mood = self.mood?;
        let draft = std::mem::take(self);
        let note = draft.note.trim();

        Some(MoodEntry {
            recorded_at: Utc::now(),
            mood,
            emotions: draft.emotions,
            note: if note.is_empty() {
                None
            } else {
                Some(note.to_string())
            },
        })
    }
}

/// Aggregate over a set of mood entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodSummary {
    pub count: u32,
    /// Mean score, None when there are no entries
    pub average: Option<f64>,
    pub lowest: Option<MoodLevel>,
    pub highest: Option<MoodLevel>,
}

impl MoodSummary {
    pub fn from_entries(entries: &[MoodEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let count = entries.len() as u32;
        let total: u32 = entries.iter().map(|e| e.mood.score() as u32).sum();

        Self {
            count,
            average: Some(total as f64 / count as f64),
            lowest: entries.iter().map(|e| e.mood).min(),
            highest: entries.iter().map(|e| e.mood).max(),
        }
    }

    /// Level closest to the average score
    pub fn typical(&self) -> Option<MoodLevel> {
        let average = self.average?;
        MoodLevel::all().iter().copied().min_by(|a, b| {
            let da = (a.score() as f64 - average).abs();
            let db = (b.score() as f64 - average).abs();
            da.total_cmp(&db)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: MoodLevel) -> MoodEntry {
        MoodEntry {
            recorded_at: Utc::now(),
            mood: level,
            emotions: Vec::new(),
            note: None,
        }
    }

    #[test]
    fn test_level_scores_roundtrip() {
        for level in MoodLevel::all() {
            assert_eq!(MoodLevel::from_score(level.score()), Some(*level));
        }
        assert_eq!(MoodLevel::from_score(4), None);
        assert!(MoodLevel::try_from(10).is_err());
    }

    #[test]
    fn test_level_serializes_as_score() {
        let json = serde_json::to_string(&MoodLevel::Good).unwrap();
        assert_eq!(json, "7");
        let parsed: MoodLevel = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, MoodLevel::Excellent);
        assert!(serde_json::from_str::<MoodLevel>("2").is_err());
    }

    #[test]
    fn test_submit_requires_level() {
        let mut draft = MoodDraft::new();
        draft.toggle(Emotion::Calm);
        assert!(!draft.can_submit());
        assert!(draft.submit().is_none());
        assert_eq!(draft.emotions(), &[Emotion::Calm]);
    }

    #[test]
    fn test_submit_builds_entry_and_clears() {
        let mut draft = MoodDraft::new();
        draft.select(MoodLevel::Good);
        draft.toggle(Emotion::Grateful);
        draft.toggle(Emotion::Anxious);
        draft.toggle(Emotion::Happy);
        draft.toggle(Emotion::Anxious);
        draft.set_note("  long walk today  ");

        let entry = draft.submit().unwrap();
        assert_eq!(entry.mood, MoodLevel::Good);
        assert_eq!(entry.emotions, vec![Emotion::Grateful, Emotion::Happy]);
        assert_eq!(entry.note.as_deref(), Some("long walk today"));

        assert!(draft.mood().is_none());
        assert!(draft.emotions().is_empty());
        assert!(draft.submit().is_none());
    }

    #[test]
    fn test_blank_note_dropped() {
        let mut draft = MoodDraft::new();
        draft.select(MoodLevel::Neutral);
        draft.set_note("   ");
        assert_eq!(draft.submit().unwrap().note, None);
    }

    #[test]
    fn test_emotion_parse() {
        assert_eq!(Emotion::from_str(" Calm "), Some(Emotion::Calm));
        assert_eq!(Emotion::from_str("bored"), None);
    }

    #[test]
    fn test_summary() {
        assert_eq!(MoodSummary::from_entries(&[]), MoodSummary::default());

        let entries = vec![
            entry(MoodLevel::Good),
            entry(MoodLevel::Low),
            entry(MoodLevel::Excellent),
        ];
        let summary = MoodSummary::from_entries(&entries);
        assert_eq!(summary.count, 3);
        assert!((summary.average.unwrap() - 19.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.lowest, Some(MoodLevel::Low));
        assert_eq!(summary.highest, Some(MoodLevel::Excellent));
        assert_eq!(summary.typical(), Some(MoodLevel::Good));
    }
}
