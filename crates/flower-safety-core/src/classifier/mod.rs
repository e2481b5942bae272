pub mod flower_check;

pub use flower_check::{ClassifyError, FlowerCheckClient};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde_json::Value;

use crate::state::Message;

/// Shown when the endpoint answers without a `response` or `message` field
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Shown for every transport or decode failure
pub const CONNECTION_ERROR_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Outcome of one classification request
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierResult {
    /// The endpoint returned a decodable payload
    Answered { text: String, payload: Value },
    /// The exchange failed; details were logged, not kept
    Failed,
}

impl ClassifierResult {
    pub fn from_payload(payload: Value) -> Self {
        let text = reply_text(&payload).to_string();
        ClassifierResult::Answered { text, payload }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ClassifierResult::Failed)
    }

    /// Turn the outcome into the bot message that settles a submission
    pub fn into_message(self, created_at: DateTime<Local>) -> Message {
        match self {
            ClassifierResult::Answered { text, payload } => {
                Message::bot(text, created_at).with_payload(payload)
            }
            ClassifierResult::Failed => Message::bot(CONNECTION_ERROR_REPLY, created_at).as_error(),
        }
    }
}

/// Pick the reply out of a payload: `response`, then `message`, then the fallback.
///
/// A field counts as present when it holds a string, even an empty one.
pub fn reply_text(payload: &Value) -> &str {
    if let Some(text) = payload.get("response").and_then(Value::as_str) {
        return text;
    }
    if let Some(text) = payload.get("message").and_then(Value::as_str) {
        return text;
    }
    FALLBACK_REPLY
}

/// Something that can answer a flower safety question
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Always produces exactly one outcome; failures come back as `Failed`.
    async fn classify(&self, flower_query: &str) -> ClassifierResult;
}
