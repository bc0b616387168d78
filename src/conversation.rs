use crate::clock::Clock;
use crate::message::{provisional_id, ChatMessage, MessageStatus};
use crate::timeline::{self, HighlightRequest, Locale, TimelineEntry};
use crate::validation::{sanitize_message, validate_message};

/// Maximum messages to keep in a conversation before trimming
pub const DEFAULT_MAX_MESSAGES: usize = 2000;

/// Messages of a single passenger/driver chat, in arrival order.
#[derive(Clone, Debug)]
pub struct Conversation {
    pub chat_id: String,
    messages: Vec<ChatMessage>,
    /// Number of unread messages
    pub unread_count: usize,
    max_messages: usize,
    next_provisional: u64,
    /// Bumped on every mutation; lets callers cache derived views.
    revision: u64,
}

impl Conversation {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self::with_limit(chat_id, DEFAULT_MAX_MESSAGES)
    }

    pub fn with_limit(chat_id: impl Into<String>, max_messages: usize) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages: Vec::new(),
            unread_count: 0,
            max_messages: max_messages.max(1),
            next_provisional: 0,
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Messages in arrival order. Changes go through the methods below so
    /// `revision` stays accurate.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    /// Append a message received from the server.
    ///
    /// A message whose id is already present replaces the stored copy instead
    /// (the server may echo messages we already have). Returns `true` if the
    /// message was new.
    pub fn add_message(&mut self, msg: ChatMessage, is_active: bool) -> bool {
        self.revision += 1;

        if let Some(pos) = self.position(&msg.id) {
            let existing = &mut self.messages[pos];
            let original_id = existing.original_id.take();
            let status = existing.status.max(msg.status);
            *existing = msg;
            existing.original_id = existing.original_id.take().or(original_id);
            existing.status = status;
            return false;
        }

        self.messages.push(msg);
        if !is_active {
            self.unread_count += 1;
        }
        self.trim();
        true
    }

    /// Add a message we are about to send, before the server knows about it.
    ///
    /// The text is sanitized, then validated; text that could never be sent
    /// is rejected and the conversation stays untouched. Returns a copy to
    /// hand to the real-time channel.
    pub fn push_provisional(
        &mut self,
        sender_id: &str,
        text: &str,
        clock: &dyn Clock,
    ) -> Result<ChatMessage, String> {
        let text = sanitize_message(text);
        validate_message(&text)?;

        let now = clock.now();
        self.next_provisional += 1;
        let msg = ChatMessage::new(
            provisional_id(self.next_provisional),
            sender_id,
            text,
            now.format("%H:%M").to_string(),
        )
        .with_status(MessageStatus::Sent)
        .with_sent_at(now);

        self.revision += 1;
        self.messages.push(msg.clone());
        self.trim();
        Ok(msg)
    }

    /// Swap a provisional message for its server-confirmed version.
    ///
    /// The confirmed message keeps the provisional id as `original_id` so its
    /// render key does not change. Returns `false` if `temp_id` is unknown.
    pub fn confirm(&mut self, temp_id: &str, mut confirmed: ChatMessage) -> bool {
        let Some(temp_pos) = self.position(temp_id) else {
            tracing::debug!(
                chat_id = %self.chat_id,
                temp_id,
                "ack for unknown provisional message"
            );
            return false;
        };
        self.revision += 1;

        let temp = self.messages.remove(temp_pos);
        let render_key = temp.original_id.unwrap_or(temp.id);

        // The confirmed copy may have arrived as a regular message first
        if let Some(existing) = self.messages.iter_mut().find(|m| m.id == confirmed.id) {
            existing.original_id = Some(render_key);
            existing.status = existing.status.max(temp.status);
            return true;
        }

        confirmed.original_id = Some(render_key);
        confirmed.status = confirmed.status.max(temp.status);
        if confirmed.sent_at.is_none() {
            confirmed.sent_at = temp.sent_at;
        }
        self.messages.insert(temp_pos, confirmed);
        true
    }

    /// Apply a delivery status update. Statuses never move backwards.
    pub fn update_status(&mut self, id: &str, status: MessageStatus) -> bool {
        let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if msg.status.is_some_and(|current| current >= status) {
            return false;
        }
        msg.status = Some(status);
        self.revision += 1;
        true
    }

    /// The peer opened the chat: every confirmed message authored by
    /// `sender_id` becomes read.
    pub fn mark_read_by_peer(&mut self, sender_id: &str) -> usize {
        let mut changed = 0;
        for msg in self.messages.iter_mut() {
            if msg.sender_id == sender_id
                && !msg.is_provisional()
                && msg.status.is_some_and(|s| s < MessageStatus::Read)
            {
                msg.status = Some(MessageStatus::Read);
                changed += 1;
            }
        }
        if changed > 0 {
            self.revision += 1;
        }
        changed
    }

    pub fn clear_unread(&mut self) {
        self.unread_count = 0;
    }

    pub fn timeline(
        &self,
        highlights: &HighlightRequest,
        clock: &dyn Clock,
        locale: Locale,
    ) -> Vec<TimelineEntry> {
        timeline::build_timeline(&self.messages, highlights, clock, locale)
    }

    /// Drop the oldest quarter once the cap is exceeded.
    fn trim(&mut self) {
        if self.messages.len() > self.max_messages {
            let trim_count = (self.max_messages / 4).max(1);
            self.messages.drain(0..trim_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::at(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 10, 42).unwrap()
    }

    #[test]
    fn test_add_message_unread_and_trim() {
        let mut conv = Conversation::with_limit("chat-1", 100);
        for i in 0..10 {
            conv.add_message(ChatMessage::new(i.to_string(), "driver", "hola", "10:00"), false);
        }
        assert_eq!(conv.unread_count, 10);

        for i in 10..(100 + 10) {
            conv.add_message(ChatMessage::new(i.to_string(), "driver", "x", "11:00"), true);
        }
        assert!(conv.messages().len() <= 100);
        assert_eq!(conv.unread_count, 10);
        // Oldest were dropped first
        assert!(conv.get("0").is_none());
        assert!(conv.get("109").is_some());
    }

    #[test]
    fn test_duplicate_ids_replace() {
        let mut conv = Conversation::new("chat-1");
        let read = ChatMessage::new("1", "me", "hola", "10:00").with_status(MessageStatus::Read);
        let sent = ChatMessage::new("1", "me", "hola", "10:00").with_status(MessageStatus::Sent);
        assert!(conv.add_message(read, true));
        assert!(!conv.add_message(sent, true));
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].status, Some(MessageStatus::Read));
    }

    #[test]
    fn test_provisional_then_confirm_keeps_render_key() {
        let mut conv = Conversation::new("chat-1");
        conv.add_message(ChatMessage::new("1", "driver", "hola", "10:00"), true);
        let temp = conv.push_provisional("me", "ya voy", &clock()).unwrap();
        assert!(temp.is_provisional());
        assert_eq!(temp.timestamp, "10:42");
        assert_eq!(temp.status, Some(MessageStatus::Sent));

        let key_before = conv.get(&temp.id).unwrap().render_key().to_string();
        let confirmed =
            ChatMessage::new("2", "me", "ya voy", "10:42").with_status(MessageStatus::Delivered);
        assert!(conv.confirm(&temp.id, confirmed));

        assert!(conv.get(&temp.id).is_none());
        let stored = conv.get("2").unwrap();
        assert_eq!(stored.render_key(), key_before);
        assert_eq!(stored.status, Some(MessageStatus::Delivered));
        assert_eq!(stored.sent_at, temp.sent_at);
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn test_confirm_after_echo() {
        let mut conv = Conversation::new("chat-1");
        let temp = conv.push_provisional("me", "ok", &clock()).unwrap();
        conv.add_message(ChatMessage::new("5", "me", "ok", "10:42"), true);
        assert!(conv.confirm(&temp.id, ChatMessage::new("5", "me", "ok", "10:42")));

        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].render_key(), temp.id);
        assert!(!conv.confirm("temp-99", ChatMessage::new("6", "me", "x", "10:00")));
    }

    #[test]
    fn test_status_moves_forward_only() {
        let mut conv = Conversation::new("chat-1");
        let sent = ChatMessage::new("1", "me", "x", "10:00").with_status(MessageStatus::Sent);
        conv.add_message(sent, true);
        assert!(conv.update_status("1", MessageStatus::Read));
        assert!(!conv.update_status("1", MessageStatus::Delivered));
        assert_eq!(conv.get("1").unwrap().status, Some(MessageStatus::Read));
        assert!(!conv.update_status("nope", MessageStatus::Read));
    }

    #[test]
    fn test_mark_read_by_peer() {
        let mut conv = Conversation::new("chat-1");
        let delivered =
            ChatMessage::new("1", "me", "x", "10:00").with_status(MessageStatus::Delivered);
        conv.add_message(delivered, true);
        conv.add_message(ChatMessage::new("2", "driver", "x", "10:01"), true);
        conv.push_provisional("me", "pending", &clock()).unwrap();
        assert_eq!(conv.mark_read_by_peer("me"), 1);
        assert_eq!(conv.get("1").unwrap().status, Some(MessageStatus::Read));
    }

    #[test]
    fn test_provisional_rejects_unsendable_text() {
        let mut conv = Conversation::new("chat-1");
        let r0 = conv.revision();

        assert!(conv.push_provisional("me", "   \x07 ", &clock()).is_err());
        assert!(conv.push_provisional("me", "", &clock()).is_err());
        assert!(conv.messages().is_empty());
        assert_eq!(conv.revision(), r0);

        // Provisional ids keep counting from where they were
        let temp = conv.push_provisional("me", "  hola\x07 ", &clock()).unwrap();
        assert_eq!(temp.text, "hola");
        assert_eq!(temp.id, provisional_id(1));
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut conv = Conversation::new("chat-1");
        let r0 = conv.revision();
        conv.add_message(ChatMessage::new("1", "me", "x", "10:00"), true);
        assert!(conv.revision() > r0);
        let r1 = conv.revision();
        conv.update_status("1", MessageStatus::Sent);
        conv.update_status("1", MessageStatus::Sent);
        assert_eq!(conv.revision(), r1 + 1);
    }

    #[test]
    fn test_clear_unread() {
        let mut conv = Conversation::new("chat-1");
        conv.add_message(ChatMessage::new("1", "a", "hello", "12:00"), false);
        assert_eq!(conv.unread_count, 1);
        conv.clear_unread();
        assert_eq!(conv.unread_count, 0);
    }
}
