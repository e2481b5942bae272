use std::sync::Arc;

use flower_safety_core::{
    ChatSession, Classifier, ClassifierResult, Clock, Message, PendingRequest, Role,
};
use ratatui::layout::Rect;
use serde_json::Value;
use tracing::{debug, warn};

use crate::tui::{AppEvent, EventSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation, draft and request state
    pub session: ChatSession,
    pub cursor: usize, // cursor position in the draft, in chars
    pub pending: Option<PendingRequest>,
    pub classifier: Arc<dyn Classifier>,
    pub endpoint: String,
    events: EventSender,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat pane
    pub chat_lines: u16,  // Wrapped line count from the last render
    pub follow_latest: bool,
    pub chat_area: Option<Rect>,
    pub show_payload: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        clock: Box<dyn Clock>,
        endpoint: String,
        events: EventSender,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            session: ChatSession::new(clock),
            cursor: 0,
            pending: None,
            classifier,
            endpoint,
            events,

            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            follow_latest: true,
            chat_area: None,
            show_payload: false,

            animation_frame: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.session.conversation().snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_in_flight()
    }

    /// Submit the draft, spawning the classifier call in the background.
    ///
    /// Does nothing for a blank draft or while a reply is pending. The reply
    /// comes back to the event loop as `AppEvent::Settled`.
    pub fn submit(&mut self) {
        let Some(pending) = self.session.begin_submit() else {
            return;
        };

        let classifier = Arc::clone(&self.classifier);
        let query = pending.query().to_string();
        let events = self.events.clone();
        tokio::spawn(async move {
            // A separate task so a panicking classifier still produces a reply
            let call = tokio::spawn(async move { classifier.classify(&query).await });
            let result = match call.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, "classifier task did not complete");
                    ClassifierResult::Failed
                }
            };
            // Fails only when the app already quit
            let _ = events.send(AppEvent::Settled(result));
        });

        self.pending = Some(pending);
        self.cursor = 0;
        self.animation_frame = 0;
        self.scroll_chat_to_bottom();
    }

    /// Append the reply for the in-flight submission
    pub fn finish_reply(&mut self, result: ClassifierResult) {
        match self.pending.take() {
            Some(pending) => {
                self.session.settle(pending, result);
                self.scroll_chat_to_bottom();
            }
            None => debug!("dropping reply with no submission in flight"),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Payload of the most recent answered bot message
    pub fn latest_payload(&self) -> Option<&Value> {
        self.messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::Bot && m.raw_response.is_some())
            .and_then(|m| m.raw_response.as_ref())
    }

    pub fn toggle_payload(&mut self) {
        self.show_payload = !self.show_payload;
    }

    pub fn scroll_down(&mut self) {
        let max = self.max_chat_scroll();
        if self.chat_scroll < max {
            self.chat_scroll += 1;
        }
        self.follow_latest = self.chat_scroll >= max;
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
        self.follow_latest = self.chat_scroll >= self.max_chat_scroll();
    }

    /// Keep the newest message (or the loading line) in view from now on
    pub fn scroll_chat_to_bottom(&mut self) {
        self.follow_latest = true;
        self.chat_scroll = self.max_chat_scroll();
    }

    /// Record the wrapped height measured while rendering.
    ///
    /// Called before the chat is drawn, so the scroll used for that frame
    /// already reaches the last line when following the latest message.
    pub fn set_chat_lines(&mut self, lines: u16) {
        self.chat_lines = lines;
        let max = self.max_chat_scroll();
        if self.follow_latest {
            self.chat_scroll = max;
        } else {
            self.chat_scroll = self.chat_scroll.min(max);
        }
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.chat_height)
    }
}
