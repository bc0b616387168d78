//! Resolution of "highlight these messages" requests.
//!
//! A request is a list of message ids, optionally containing the sentinel
//! `"last"` which stands for the newest message of the conversation. Requests
//! are normally passed in explicitly; `HighlightRequest::from_storage` covers
//! hosts that still hand them over as a serialized list in a key-value store.

use std::collections::HashSet;

use serde_json::Value;

use crate::message::ChatMessage;

use super::assemble::TimelineEntry;

/// Sentinel id meaning "the most recent message".
pub const LAST_MESSAGE_SENTINEL: &str = "last";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightRequest {
    ids: Vec<String>,
}

impl HighlightRequest {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn explicit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn last_message() -> Self {
        Self::explicit([LAST_MESSAGE_SENTINEL])
    }

    /// Build a request from the legacy storage pair: a JSON list of ids and a
    /// single fallback id.
    ///
    /// An unparseable list degrades to the single id (or nothing); it is
    /// logged, never returned as an error.
    pub fn from_storage(serialized: Option<&str>, single: Option<&str>) -> Self {
        let fallback = || Self::explicit(single.filter(|s| !s.is_empty()));

        let Some(raw) = serialized.filter(|s| !s.trim().is_empty()) else {
            return fallback();
        };

        match serde_json::from_str::<Vec<Value>>(raw) {
            Ok(values) => Self {
                ids: values.into_iter().filter_map(id_from_value).collect(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "unreadable highlight id list, using single id");
                fallback()
            }
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Concrete ids to highlight. `"last"` becomes the id of the final message
    /// of `messages` in input order, and is dropped when there is none.
    pub fn resolve(&self, messages: &[ChatMessage]) -> HashSet<String> {
        let last_id = messages.last().map(|m| m.id.as_str());
        self.ids
            .iter()
            .filter_map(|id| {
                if id == LAST_MESSAGE_SENTINEL {
                    last_id.map(str::to_string)
                } else {
                    Some(id.clone())
                }
            })
            .collect()
    }
}

/// Ids are usually strings, but numeric server ids show up too.
fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Set `highlighted` on every message entry, true iff its id is in `resolved`.
pub fn apply_highlights(entries: &mut [TimelineEntry], resolved: &HashSet<String>) {
    for entry in entries.iter_mut() {
        if let TimelineEntry::Message(msg) = entry {
            msg.highlighted = resolved.contains(&msg.message.id);
        }
    }
}
