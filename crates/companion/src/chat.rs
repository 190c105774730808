//! Chat companion
//!
//! A conversation is a list of messages that opens with a greeting. The reply
//! text comes from a `Responder`; the stock one answers every message with the
//! same supportive prompt after a short pause.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Opening message of every conversation
pub const GREETING: &str = "Hello! I'm here to support you on your mental wellbeing journey. How are you feeling today?";

/// Reply given by the canned responder
pub const CANNED_REPLY: &str = "Thank you for sharing. I hear that you're going through something important. Would you like to tell me more about what's on your mind?";

/// Quick-start messages offered to the user
pub const SUGGESTIONS: [&str; 4] = [
    "I'm feeling anxious",
    "Having trouble sleeping",
    "Feeling overwhelmed",
    "Need motivation",
];

/// Failure to produce a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Responder failed: {0}")]
pub struct ResponderError(pub String);

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Produces assistant replies
pub trait Responder: Send + Sync {
    fn respond(&self, text: &str) -> impl Future<Output = Result<String, ResponderError>> + Send;
}

/// Stand-in responder with a fixed reply
#[derive(Debug, Clone, Copy)]
pub struct CannedResponder {
    delay: Duration,
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl CannedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Responder for CannedResponder {
    async fn respond(&self, _text: &str) -> Result<String, ResponderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(CANNED_REPLY.to_string())
    }
}

/// Message history with the companion
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Start a conversation with the greeting
    pub fn new() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 0,
        };
        conversation.push(Role::Assistant, GREETING.to_string());
        conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn push(&mut self, role: Role, content: String) -> &ChatMessage {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: format!("msg-{}", self.next_id),
            role,
            content,
            timestamp: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Send a user message and append the reply.
    ///
    /// Blank input is ignored and returns `Ok(None)`. If the responder fails
    /// the user's message stays in the history.
    pub async fn send<R: Responder>(
        &mut self,
        text: &str,
        responder: &R,
    ) -> Result<Option<&ChatMessage>, ResponderError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.push(Role::User, text.to_string());
        debug!(chars = text.len(), "Waiting for reply");

        let reply = responder.respond(text).await?;
        Ok(Some(self.push(Role::Assistant, reply)))
    }
}
