//! UI-agnostic message types
//!
//! These are shared by every front end and don't depend on any UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Greeting the bot opens every conversation with
pub const GREETING: &str =
    "Hi! I'm your Flower Safety Assistant. Ask me about any flower to find out if it's safe for your pets! 🐾";

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Local>,
    pub is_error: bool,
    /// Decoded response payload, kept for display next to the answer
    pub raw_response: Option<Value>,
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Bot,
}

impl Message {
    pub fn user(text: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at,
            is_error: false,
            raw_response: None,
        }
    }

    pub fn bot(text: impl Into<String>, created_at: DateTime<Local>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            created_at,
            is_error: false,
            raw_response: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.raw_response = Some(payload);
        self
    }

    pub fn as_error(mut self) -> Self {
        self.is_error = true;
        self
    }

    /// Local time in the `3:07 PM` style shown under each message
    pub fn display_time(&self) -> String {
        self.created_at.format("%-I:%M %p").to_string()
    }
}
