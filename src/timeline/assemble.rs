//! Interleaving of day separators and messages into the render sequence.

use serde::Serialize;

use crate::clock::Clock;
use crate::message::ChatMessage;

use super::group::DayBucket;
use super::label::{separator_label, Locale};

/// Synthetic entry marking the start of a calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSeparator {
    pub label: String,
    /// `YYYY-MM-DD`
    pub date_key: String,
}

/// A message as the chat view renders it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageEntry {
    pub message: ChatMessage,
    pub highlighted: bool,
}

/// One row of the chat view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimelineEntry {
    Separator(DateSeparator),
    Message(MessageEntry),
}

impl TimelineEntry {
    pub fn as_message(&self) -> Option<&MessageEntry> {
        match self {
            TimelineEntry::Message(entry) => Some(entry),
            TimelineEntry::Separator(_) => None,
        }
    }

    pub fn as_separator(&self) -> Option<&DateSeparator> {
        match self {
            TimelineEntry::Separator(sep) => Some(sep),
            TimelineEntry::Message(_) => None,
        }
    }
}

/// Emit one separator per bucket followed by the bucket's messages.
///
/// Messages start out unhighlighted; see `highlight::apply_highlights`.
pub fn assemble(
    buckets: Vec<DayBucket<'_>>,
    clock: &dyn Clock,
    locale: Locale,
) -> Vec<TimelineEntry> {
    let total: usize = buckets.iter().map(|b| b.messages.len() + 1).sum();
    let mut entries = Vec::with_capacity(total);

    for bucket in buckets {
        entries.push(TimelineEntry::Separator(DateSeparator {
            label: separator_label(bucket.date, clock, locale),
            date_key: bucket.key(),
        }));
        entries.extend(bucket.messages.into_iter().map(|timed| {
            TimelineEntry::Message(MessageEntry {
                message: timed.message.clone(),
                highlighted: false,
            })
        }));
    }

    entries
}
