//! Entry storage
//!
//! Submitted mood check-ins and journal pages are handed to an `EntryStore`.
//! - LogStore: records the entry in the log and nothing else
//! - JsonlStore: ~/.local/share/mindmate/companion/entries-YYYY-MM-DD.jsonl

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::journal::JournalEntry;
use crate::mood::MoodEntry;

/// Anything the user submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Mood(MoodEntry),
    Journal(JournalEntry),
}

impl Entry {
    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Mood(m) => m.recorded_at,
            Entry::Journal(j) => j.recorded_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Mood(_) => "mood",
            Entry::Journal(_) => "journal",
        }
    }
}

impl From<MoodEntry> for Entry {
    fn from(entry: MoodEntry) -> Self {
        Entry::Mood(entry)
    }
}

impl From<JournalEntry> for Entry {
    fn from(entry: JournalEntry) -> Self {
        Entry::Journal(entry)
    }
}

/// Destination for submitted entries
pub trait EntryStore {
    fn save(&self, entry: &Entry) -> Result<()>;
}

/// Logs entries without keeping them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStore;

impl EntryStore for LogStore {
    fn save(&self, entry: &Entry) -> Result<()> {
        let json = serde_json::to_string(entry).context("Failed to serialize entry")?;
        info!(kind = entry.kind(), entry = %json, "Saving entry");
        Ok(())
    }
}

/// Daily JSONL files
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create entry directory: {}", data_dir.display()))?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    fn log_path(&self, date: &NaiveDate) -> PathBuf {
        self.data_dir.join(format!("entries-{}.jsonl", date))
    }

    /// All entries recorded on a date, in file order
    pub fn entries_for_date(&self, date: &NaiveDate) -> Result<Vec<Entry>> {
        let path = self.log_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)
            .with_context(|| format!("Failed to open entry log: {}", path.display()))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {} of {}", line_num + 1, path.display()))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Entry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %path.display(), line = line_num + 1, error = %e, "Skipping malformed entry"),
            }
        }

        Ok(entries)
    }

    /// Dates that have an entry log, in no particular order
    fn logged_dates(&self) -> Result<Vec<NaiveDate>> {
        let dir = fs::read_dir(&self.data_dir)
            .with_context(|| format!("Failed to list entry directory: {}", self.data_dir.display()))?;

        let mut dates = Vec::new();
        for item in dir {
            let item = item.with_context(|| format!("Failed to list entry directory: {}", self.data_dir.display()))?;
            let name = item.file_name();
            let date = name
                .to_str()
                .and_then(|n| n.strip_prefix("entries-"))
                .and_then(|n| n.strip_suffix(".jsonl"))
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            if let Some(date) = date {
                dates.push(date);
            }
        }

        Ok(dates)
    }

    /// Entries from today and the previous `days - 1` days, oldest first.
    /// Windows reaching past the calendar's range cover every log.
    pub fn entries_for_days(&self, days: u32) -> Result<Vec<Entry>> {
        if days == 0 {
            return Ok(Vec::new());
        }

        let today = Utc::now().date_naive();
        let oldest = today.checked_sub_days(Days::new(days as u64 - 1));

        let mut dates: Vec<NaiveDate> = self
            .logged_dates()?
            .into_iter()
            .filter(|d| *d <= today && oldest.map_or(true, |o| *d >= o))
            .collect();
        dates.sort();

        let mut all = Vec::new();
        for date in &dates {
            all.extend(self.entries_for_date(date)?);
        }

        all.sort_by_key(|e| e.recorded_at());
        Ok(all)
    }

    pub fn mood_entries_for_days(&self, days: u32) -> Result<Vec<MoodEntry>> {
        Ok(self
            .entries_for_days(days)?
            .into_iter()
            .filter_map(|e| match e {
                Entry::Mood(m) => Some(m),
                Entry::Journal(_) => None,
            })
            .collect())
    }
}

impl EntryStore for JsonlStore {
    fn save(&self, entry: &Entry) -> Result<()> {
        let path = self.log_path(&entry.recorded_at().date_naive());
        let line = serde_json::to_string(entry).context("Failed to serialize entry")?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open entry log: {}", path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to entry log: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{Emotion, MoodLevel};
    use tempfile::TempDir;

    fn mood(level: MoodLevel, at: DateTime<Utc>) -> Entry {
        Entry::Mood(MoodEntry {
            recorded_at: at,
            mood: level,
            emotions: vec![Emotion::Calm],
            note: None,
        })
    }

    #[test]
    fn test_entry_json_is_tagged() {
        let entry = Entry::Journal(JournalEntry {
            recorded_at: Utc::now(),
            prompt: "p".into(),
            body: "b".into(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "journal");
        assert_eq!(value["body"], "b");
    }

    #[test]
    fn test_log_store_accepts_everything() {
        assert!(LogStore.save(&mood(MoodLevel::Low, Utc::now())).is_ok());
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(&dir.path().join("companion")).unwrap();

        let now = Utc::now();
        let first = mood(MoodLevel::Good, now - chrono::Duration::seconds(5));
        let second = Entry::Journal(JournalEntry {
            recorded_at: now,
            prompt: "Describe a place where you feel most at peace.".into(),
            body: "The lake at dawn".into(),
        });

        store.save(&second).unwrap();
        store.save(&first).unwrap();

        let today = store.entries_for_date(&now.date_naive()).unwrap();
        assert!(!today.is_empty());

        let entries = store.entries_for_days(2).unwrap();
        assert_eq!(entries, vec![first, second]);

        let moods = store.mood_entries_for_days(2).unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].mood, MoodLevel::Good);
    }

    #[test]
    fn test_older_days_included() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path()).unwrap();

        let now = Utc::now();
        store.save(&mood(MoodLevel::Low, now - chrono::Duration::days(2))).unwrap();
        store.save(&mood(MoodLevel::Good, now)).unwrap();

        assert_eq!(store.entries_for_days(1).unwrap().len(), 1);
        assert_eq!(store.entries_for_days(3).unwrap().len(), 2);
    }

    #[test]
    fn test_huge_window_covers_everything() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path()).unwrap();

        let now = Utc::now();
        store.save(&mood(MoodLevel::Low, now - chrono::Duration::days(4000))).unwrap();
        store.save(&mood(MoodLevel::Good, now)).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a log").unwrap();

        assert_eq!(store.entries_for_days(u32::MAX).unwrap().len(), 2);
        assert_eq!(store.entries_for_days(200_000_000).unwrap().len(), 2);
        assert!(store.entries_for_days(0).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path()).unwrap();
        let now = Utc::now();
        store.save(&mood(MoodLevel::Neutral, now)).unwrap();

        let path = dir.path().join(format!("entries-{}.jsonl", now.date_naive()));
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();

        assert_eq!(store.entries_for_date(&now.date_naive()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_day_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(store.entries_for_date(&date).unwrap().is_empty());
    }
}
