//! Submission flow for one chat session
//!
//! `ChatSession` owns the conversation, the draft text and the single-flight
//! request state. A submission goes `Idle -> Submitting -> Idle`:
//! [`ChatSession::begin_submit`] hands out a [`PendingRequest`] and
//! [`ChatSession::settle`] consumes it, so every accepted submission gets
//! exactly one bot reply.

use tracing::debug;

use crate::classifier::{Classifier, ClassifierResult};
use crate::clock::Clock;
use crate::conversation::Conversation;
use crate::state::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Submitting,
}

/// The one request allowed in flight. Hand it back to `settle` when the
/// classifier is done.
#[must_use = "a pending request must be settled or the session stays in flight"]
#[derive(Debug)]
pub struct PendingRequest {
    query: String,
}

impl PendingRequest {
    pub fn query(&self) -> &str {
        &self.query
    }
}

pub struct ChatSession {
    conversation: Conversation,
    draft: String,
    state: RequestState,
    clock: Box<dyn Clock>,
}

impl ChatSession {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            conversation: Conversation::new(clock.now()),
            draft: String::new(),
            state: RequestState::Idle,
            clock,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The draft stays editable while a request is in flight
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == RequestState::Submitting
    }

    /// Whether `begin_submit` would accept the current draft
    pub fn can_submit(&self) -> bool {
        self.state == RequestState::Idle && !self.draft.trim().is_empty()
    }

    /// Accept the draft if it is non-blank and nothing is in flight.
    ///
    /// Appends the user message with the untrimmed draft, clears the draft
    /// and marks the session in flight. Returns `None` without touching
    /// anything otherwise.
    pub fn begin_submit(&mut self) -> Option<PendingRequest> {
        if self.state == RequestState::Submitting {
            debug!("submit ignored: request already in flight");
            return None;
        }
        if self.draft.trim().is_empty() {
            debug!("submit ignored: blank draft");
            return None;
        }

        let query = std::mem::take(&mut self.draft);
        self.conversation.append(Message::user(query.clone(), self.clock.now()));
        self.state = RequestState::Submitting;
        debug!(chars = query.chars().count(), "submission started");

        Some(PendingRequest { query })
    }

    /// Append the bot reply for `pending` and return to idle
    pub fn settle(&mut self, pending: PendingRequest, result: ClassifierResult) {
        let failed = result.is_error();
        self.conversation.append(result.into_message(self.clock.now()));
        self.state = RequestState::Idle;
        debug!(failed, query_chars = pending.query.chars().count(), "submission settled");
    }

    /// Submit the draft and wait for the classifier in place.
    ///
    /// Returns `false` if the submission was skipped.
    pub async fn submit_with<C>(&mut self, classifier: &C) -> bool
    where
        C: Classifier + ?Sized,
    {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let result = classifier.classify(pending.query()).await;
        self.settle(pending, result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{CONNECTION_ERROR_REPLY, FALLBACK_REPLY};
    use crate::clock::FixedClock;
    use crate::state::{Role, GREETING};
    use async_trait::async_trait;
    use chrono::{Local, TimeZone};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replies with a fixed outcome and records every query it sees
    struct ScriptedClassifier {
        outcome: ClassifierResult,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedClassifier {
        fn answering(payload: Value) -> Self {
            Self {
                outcome: ClassifierResult::from_payload(payload),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                outcome: ClassifierResult::Failed,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        async fn classify(&self, flower_query: &str) -> ClassifierResult {
            self.queries.lock().unwrap().push(flower_query.to_string());
            self.outcome.clone()
        }
    }

    fn session() -> ChatSession {
        let at = Local.with_ymd_and_hms(2024, 3, 14, 10, 15, 0).unwrap();
        ChatSession::new(Box::new(FixedClock(at)))
    }

    fn session_with_draft(text: &str) -> ChatSession {
        let mut session = session();
        session.draft_mut().push_str(text);
        session
    }

    #[test]
    fn test_begin_submit_appends_raw_user_message() {
        let mut session = session_with_draft("  daffodils  ");
        let pending = session.begin_submit().expect("submission accepted");

        assert_eq!(pending.query(), "  daffodils  ");
        assert_eq!(session.draft(), "");
        assert!(session.is_in_flight());

        let last = session.conversation().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.text, "  daffodils  ");
        assert!(!last.is_error);

        session.settle(pending, ClassifierResult::Failed);
    }

    #[test]
    fn test_blank_draft_is_ignored() {
        for blank in ["", "   ", "\t\n "] {
            let mut session = session_with_draft(blank);
            assert!(!session.can_submit());
            assert!(session.begin_submit().is_none());
            assert_eq!(session.conversation().len(), 1);
            assert_eq!(session.state(), RequestState::Idle);
            assert_eq!(session.draft(), blank);
        }
    }

    #[test]
    fn test_submit_while_in_flight_is_ignored() {
        let mut session = session_with_draft("roses");
        let pending = session.begin_submit().unwrap();

        session.draft_mut().push_str("tulips");
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.draft(), "tulips");

        session.settle(pending, ClassifierResult::from_payload(json!({ "response": "ok" })));
        assert_eq!(session.conversation().len(), 3);
    }

    #[test]
    fn test_settle_returns_to_idle_and_accepts_again() {
        let mut session = session_with_draft("roses");
        let pending = session.begin_submit().unwrap();
        session.settle(pending, ClassifierResult::Failed);

        assert_eq!(session.state(), RequestState::Idle);
        session.draft_mut().push_str("tulips");
        assert!(session.can_submit());
        let pending = session.begin_submit().expect("accepted after settle");
        session.settle(pending, ClassifierResult::Failed);
        assert_eq!(session.conversation().len(), 5);
    }

    #[test]
    fn test_timestamps_come_from_clock() {
        let at = Local.with_ymd_and_hms(2024, 3, 14, 10, 15, 0).unwrap();
        let mut session = session_with_draft("roses");
        let pending = session.begin_submit().unwrap();
        session.settle(pending, ClassifierResult::Failed);

        assert!(session.conversation().snapshot().iter().all(|m| m.created_at == at));
    }

    #[tokio::test]
    async fn test_success_adds_user_and_bot_messages() {
        let classifier = ScriptedClassifier::answering(json!({ "response": "Yes, roses are pet safe." }));
        let mut session = session_with_draft("Are roses safe?");

        assert!(session.submit_with(&classifier).await);

        let messages = session.conversation().snapshot();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Bot);
        assert_eq!(messages[2].text, "Yes, roses are pet safe.");
        assert!(!messages[2].is_error);
        assert_eq!(
            messages[2].raw_response,
            Some(json!({ "response": "Yes, roses are pet safe." }))
        );
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_message_field_is_used() {
        let classifier = ScriptedClassifier::answering(json!({ "message": "Lilies are toxic to cats." }));
        let mut session = session_with_draft("lilies");
        session.submit_with(&classifier).await;

        assert_eq!(session.conversation().last().unwrap().text, "Lilies are toxic to cats.");
    }

    #[tokio::test]
    async fn test_empty_payload_uses_fallback_without_error() {
        let classifier = ScriptedClassifier::answering(json!({}));
        let mut session = session_with_draft("mystery flower");
        session.submit_with(&classifier).await;

        let last = session.conversation().last().unwrap();
        assert_eq!(last.text, FALLBACK_REPLY);
        assert!(!last.is_error);
    }

    #[tokio::test]
    async fn test_failure_adds_error_message() {
        let classifier = ScriptedClassifier::failing();
        let mut session = session_with_draft("roses");
        session.submit_with(&classifier).await;

        let messages = session.conversation().snapshot();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].text, CONNECTION_ERROR_REPLY);
        assert!(messages[2].is_error);
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_skipped_submission_does_not_call_classifier() {
        let classifier = ScriptedClassifier::failing();
        let mut session = session_with_draft("    ");

        assert!(!session.submit_with(&classifier).await);
        assert!(classifier.queries().is_empty());
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_tulip_conversation() {
        let classifier =
            ScriptedClassifier::answering(json!({ "response": "Tulips are mildly toxic to dogs." }));
        let mut session = session();
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().snapshot()[0].text, GREETING);

        session.draft_mut().push_str("Are tulips safe for dogs?");
        let pending = session.begin_submit().unwrap();
        assert_eq!(session.conversation().len(), 2);

        let result = classifier.classify(pending.query()).await;
        session.settle(pending, result);

        let messages = session.conversation().snapshot();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "Are tulips safe for dogs?");
        assert_eq!(messages[2].role, Role::Bot);
        assert_eq!(messages[2].text, "Tulips are mildly toxic to dogs.");
        assert!(!messages[2].is_error);
        assert_eq!(classifier.queries(), vec!["Are tulips safe for dogs?".to_string()]);
    }
}
