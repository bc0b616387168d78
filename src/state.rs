//! Core chat state, separated from presentation.
//!
//! `ChatState` holds everything the chat screens render from: the
//! conversations the user takes part in, which one is open, and the
//! current highlight request. Views receive it as a parameter rather than
//! owning it.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::Settings;
use crate::conversation::Conversation;
use crate::timeline::{HighlightRequest, Locale, TimelineEntry};

/// A highlight request plus the counter that signals it changed.
#[derive(Clone, Debug, Default)]
pub struct HighlightSignal {
    counter: u64,
    request: HighlightRequest,
}

impl HighlightSignal {
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn request(&self) -> &HighlightRequest {
        &self.request
    }
}

/// Inputs a cached timeline was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TimelineKey {
    revision: u64,
    highlight_counter: u64,
    today: NaiveDate,
    locale: Locale,
}

#[derive(Debug)]
struct CachedTimeline {
    key: TimelineKey,
    entries: Vec<TimelineEntry>,
}

#[derive(Debug)]
pub struct ChatState {
    /// Id of the signed-in passenger or driver.
    pub user_id: String,

    pub locale: Locale,

    /// Whether the real-time channel is currently connected.
    pub is_connected: bool,

    /// Conversations keyed by chat id.
    pub conversations: HashMap<String, Conversation>,

    /// Chat currently on screen.
    pub active_chat: Option<String>,

    /// Connection notices shown in the status bar.
    pub status_log: Vec<String>,

    max_buffer_messages: usize,
    highlight: HighlightSignal,
    timelines: HashMap<String, CachedTimeline>,
}

impl ChatState {
    pub fn new(user_id: impl Into<String>, locale: Locale) -> Self {
        Self {
            user_id: user_id.into(),
            locale,
            is_connected: false,
            conversations: HashMap::new(),
            active_chat: None,
            status_log: Vec::new(),
            max_buffer_messages: crate::conversation::DEFAULT_MAX_MESSAGES,
            highlight: HighlightSignal::default(),
            timelines: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut state = Self::new(settings.user_id.clone(), settings.locale);
        state.max_buffer_messages = settings.max_buffer_messages;
        state
    }

    /// Get a mutable reference to a conversation, creating it if needed.
    pub fn ensure_conversation(&mut self, chat_id: &str) -> &mut Conversation {
        let limit = self.max_buffer_messages;
        self.conversations
            .entry(chat_id.to_string())
            .or_insert_with(|| Conversation::with_limit(chat_id, limit))
    }

    /// Open a chat; its unread counter resets.
    pub fn set_active(&mut self, chat_id: &str) {
        self.ensure_conversation(chat_id).clear_unread();
        self.active_chat = Some(chat_id.to_string());
    }

    pub fn is_active(&self, chat_id: &str) -> bool {
        self.active_chat.as_deref() == Some(chat_id)
    }

    /// Replace the highlight request and bump the change counter.
    pub fn request_highlight(&mut self, request: HighlightRequest) {
        self.highlight.counter += 1;
        self.highlight.request = request;
    }

    pub fn highlight(&self) -> &HighlightSignal {
        &self.highlight
    }

    pub fn total_unread(&self) -> usize {
        self.conversations.values().map(|c| c.unread_count).sum()
    }

    /// Render sequence for a chat.
    ///
    /// Rebuilt only when the conversation changed, the highlight counter moved,
    /// the locale changed or the day rolled over (which changes "Hoy"/"Ayer"
    /// labels).
    pub fn timeline(&mut self, chat_id: &str, clock: &dyn Clock) -> &[TimelineEntry] {
        let Some(conversation) = self.conversations.get(chat_id) else {
            self.timelines.remove(chat_id);
            return &[];
        };

        let key = TimelineKey {
            revision: conversation.revision(),
            highlight_counter: self.highlight.counter,
            today: clock.today(),
            locale: self.locale,
        };

        let stale = self
            .timelines
            .get(chat_id)
            .map_or(true, |cached| cached.key != key);
        if stale {
            let entries = conversation.timeline(&self.highlight.request, clock, self.locale);
            self.timelines
                .insert(chat_id.to_string(), CachedTimeline { key, entries });
        }

        self.timelines
            .get(chat_id)
            .map(|cached| cached.entries.as_slice())
            .unwrap_or(&[])
    }
}
