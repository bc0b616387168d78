//! Chat message model shared by the conversation buffers, the wire protocol
//! and the timeline pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prefix marking a client-generated id that the server has not confirmed yet.
pub const PROVISIONAL_ID_PREFIX: &str = "temp-";

/// Delivery status of a message we authored.
///
/// Ordered so that a status can only move forward: `Sent < Delivered < Read`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

/// A single message of a passenger/driver conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    /// Id the message had before the server confirmed it; used as render key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    pub sender_id: String,
    pub text: String,
    /// Display timestamp, `HH:MM` or `DD/MM/YYYY, HH:MM`.
    pub timestamp: String,
    /// Absent for messages authored by the other participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    /// Canonical local time, preferred over `timestamp` for ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<NaiveDateTime>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            original_id: None,
            sender_id: sender_id.into(),
            text: text.into(),
            timestamp: timestamp.into(),
            status: None,
            sent_at: None,
        }
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_sent_at(mut self, sent_at: NaiveDateTime) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    /// Whether the server has not acknowledged this message yet.
    pub fn is_provisional(&self) -> bool {
        is_provisional_id(&self.id)
    }

    /// Key the UI uses to identify the element; survives confirmation.
    pub fn render_key(&self) -> &str {
        self.original_id.as_deref().unwrap_or(&self.id)
    }
}

pub fn is_provisional_id(id: &str) -> bool {
    id.starts_with(PROVISIONAL_ID_PREFIX)
}

/// Build a provisional id from a client-side sequence number.
pub fn provisional_id(seq: u64) -> String {
    format!("{}{}", PROVISIONAL_ID_PREFIX, seq)
}
