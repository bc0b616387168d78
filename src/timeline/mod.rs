//! Chat timeline pipeline.
//!
//! Turns the raw message list of a conversation into the sequence the chat
//! view renders:
//! - `timestamp`: display string to local point in time
//! - `sort`: chronological order, provisional messages last
//! - `group`: buckets per calendar day
//! - `label`: "Hoy" / "Ayer" / long date
//! - `assemble`: separators interleaved with messages
//! - `highlight`: marks requested messages
//!
//! Every step is pure; rebuilding on each render is the intended usage.

pub mod assemble;
pub mod group;
pub mod highlight;
pub mod label;
pub mod sort;
pub mod timestamp;

pub use assemble::{DateSeparator, MessageEntry, TimelineEntry};
pub use highlight::{HighlightRequest, LAST_MESSAGE_SENTINEL};
pub use label::Locale;

use crate::clock::Clock;
use crate::message::ChatMessage;

/// Build the render sequence for `messages`.
pub fn build_timeline(
    messages: &[ChatMessage],
    highlights: &HighlightRequest,
    clock: &dyn Clock,
    locale: Locale,
) -> Vec<TimelineEntry> {
    let sorted = sort::sort_messages(messages, clock);
    let buckets = group::group_by_day(sorted);
    let mut entries = assemble::assemble(buckets, clock, locale);

    let resolved = highlights.resolve(messages);
    highlight::apply_highlights(&mut entries, &resolved);

    tracing::trace!(
        messages = messages.len(),
        entries = entries.len(),
        highlighted = resolved.len(),
        "timeline built"
    );
    entries
}
