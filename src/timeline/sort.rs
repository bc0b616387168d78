//! Chronological ordering of a conversation.

use chrono::NaiveDateTime;

use crate::clock::Clock;
use crate::message::ChatMessage;

use super::timestamp::message_time;

/// A message paired with its parsed point in time.
///
/// The time is computed once here and reused by the day grouper.
#[derive(Clone, Debug)]
pub struct TimedMessage<'a> {
    pub message: &'a ChatMessage,
    pub at: NaiveDateTime,
}

/// Order messages for display.
///
/// Confirmed messages come first, then provisional ones (still pending
/// send). Within each group messages are ordered by time; equal times keep
/// input order because `sort_by` is stable.
pub fn sort_messages<'a>(messages: &'a [ChatMessage], clock: &dyn Clock) -> Vec<TimedMessage<'a>> {
    let mut timed: Vec<TimedMessage<'a>> = messages
        .iter()
        .map(|message| TimedMessage {
            message,
            at: message_time(message, clock),
        })
        .collect();

    timed.sort_by(|a, b| {
        a.message
            .is_provisional()
            .cmp(&b.message.is_provisional())
            .then_with(|| a.at.cmp(&b.at))
    });

    timed
}
