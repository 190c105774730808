//! Relaxing activities
//!
//! Short practices suggested alongside the breathing guide.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub title: &'static str,
    pub description: &'static str,
}

pub const ACTIVITIES: [Activity; 6] = [
    Activity {
        title: "Deep Breathing",
        description: "Take 5 slow, deep breaths. Inhale for 4 seconds, hold for 4, exhale for 6.",
    },
    Activity {
        title: "Listen to Calming Music",
        description: "Put on your favorite soothing playlist or nature sounds for 10 minutes.",
    },
    Activity {
        title: "Take a Nature Walk",
        description: "Step outside and observe the trees, sky, and sounds around you mindfully.",
    },
    Activity {
        title: "Progressive Relaxation",
        description: "Tense and release each muscle group from your toes to your head.",
    },
    Activity {
        title: "Gratitude Journaling",
        description: "Write down 3 things you're grateful for today, no matter how small.",
    },
    Activity {
        title: "Mindful Meditation",
        description: "Sit quietly for 5 minutes, focusing only on the present moment.",
    },
];

pub fn all() -> &'static [Activity] {
    &ACTIVITIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_unique() {
        let mut titles: Vec<&str> = all().iter().map(|a| a.title).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 6);
    }
}
