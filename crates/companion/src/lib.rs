//! companion - The rest of MindMate around the breathing guide
//!
//! "A gentle place to check in with yourself."
//!
//! - Auth gate: route guard over an external auth provider
//! - Accounts: local auth providers, in memory or kept in a file
//! - Chat: a conversation with a pluggable responder
//! - Mood: a five-point mood scale with emotion tags
//! - Journal: rotating reflection prompts
//! - Activities: quick relaxation ideas
//! - Store: where mood and journal entries go once submitted
//!
//! Commands:
//! - auth sign-up / sign-in / sign-out: Manage the local session
//! - mood log / mood history: Record and review moods
//! - journal prompt / journal write: Reflect on a prompt
//! - chat: Talk with the companion
//! - activities: List relaxing activities

pub mod accounts;
pub mod activities;
pub mod auth;
pub mod chat;
pub mod journal;
pub mod mood;
pub mod settings;
pub mod store;

pub use accounts::{AccountBook, InMemoryAuth, LocalAuth};
pub use auth::{guard, AuthError, AuthProvider, AuthStatus, Route, RouteDecision, User};
pub use chat::{CannedResponder, Conversation, Responder};
pub use journal::{Journal, JournalEntry, PromptRotator};
pub use mood::{Emotion, MoodDraft, MoodEntry, MoodLevel, MoodSummary};
pub use settings::{CompanionSettings, StoreKind};
pub use store::{Entry, EntryStore, JsonlStore, LogStore};
