//! Settings for the "companion" config section

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where submitted entries go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Write entries to the log only
    #[default]
    Log,
    /// Append entries to daily JSONL files
    Jsonl,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionSettings {
    pub store: StoreKind,
    /// Pause before the canned chat reply, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_delay_ms: Option<u64>,
    /// Treat new accounts as confirmed instead of waiting for
    /// `mindmate auth confirm`
    pub auto_confirm: bool,
}

impl CompanionSettings {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms.unwrap_or(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: CompanionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.store, StoreKind::Log);
        assert_eq!(settings.reply_delay(), Duration::from_secs(1));
        assert!(!settings.auto_confirm);
    }

    #[test]
    fn test_parse() {
        let settings: CompanionSettings =
            serde_json::from_str(r#"{"store": "jsonl", "reply_delay_ms": 0, "auto_confirm": true}"#).unwrap();
        assert_eq!(settings.store, StoreKind::Jsonl);
        assert!(settings.reply_delay().is_zero());
        assert!(settings.auto_confirm);
    }
}
