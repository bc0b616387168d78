//! Real-time event processing (new messages, acks, status changes).

use crossbeam_channel::Receiver;

use crate::clock::Clock;
use crate::protocol::ChannelEvent;
use crate::state::ChatState;

/// Keep the status log from growing without bound
const MAX_STATUS_LOG: usize = 200;

/// Drain all pending events from the real-time backend into `state`.
///
/// Returns the number of events applied.
pub fn process_events(
    event_rx: &Receiver<ChannelEvent>,
    state: &mut ChatState,
    clock: &dyn Clock,
) -> usize {
    let mut count = 0;
    while let Ok(event) = event_rx.try_recv() {
        apply_event(state, event, clock);
        count += 1;
    }
    count
}

pub fn apply_event(state: &mut ChatState, event: ChannelEvent, clock: &dyn Clock) {
    match event {
        ChannelEvent::Connected => {
            state.is_connected = true;
            push_status(state, clock, "✓ Connected".to_string());
        }

        ChannelEvent::Disconnected(reason) => {
            state.is_connected = false;
            push_status(state, clock, format!("✗ Disconnected: {}", reason));
        }

        ChannelEvent::Error(msg) => {
            tracing::warn!(error = %msg, "real-time channel error");
            push_status(state, clock, format!("⚠ Error: {}", msg));
        }

        ChannelEvent::MessageReceived { chat_id, message } => {
            // Our own messages never count as unread
            let seen = state.is_active(&chat_id) || message.sender_id == state.user_id;
            state.ensure_conversation(&chat_id).add_message(message, seen);
        }

        ChannelEvent::MessageConfirmed { chat_id, temp_id, message } => {
            let conversation = state.ensure_conversation(&chat_id);
            if !conversation.confirm(&temp_id, message.clone()) {
                // Provisional copy is gone (trimmed, or sent from another device)
                conversation.add_message(message, true);
            }
        }

        ChannelEvent::StatusChanged { chat_id, message_id, status } => {
            let updated = state
                .conversations
                .get_mut(&chat_id)
                .is_some_and(|c| c.update_status(&message_id, status));
            if !updated {
                tracing::debug!(%chat_id, %message_id, ?status, "status update ignored");
            }
        }

        ChannelEvent::ChatRead { chat_id, reader_id } => {
            // Our own read receipts (from another device) change nothing here
            if reader_id == state.user_id {
                return;
            }
            let user_id = state.user_id.clone();
            if let Some(conversation) = state.conversations.get_mut(&chat_id) {
                let changed = conversation.mark_read_by_peer(&user_id);
                tracing::debug!(%chat_id, %reader_id, changed, "peer read the chat");
            }
        }
    }
}

fn push_status(state: &mut ChatState, clock: &dyn Clock, text: String) {
    let ts = clock.now().format("%H:%M:%S");
    state.status_log.push(format!("[{}] {}", ts, text));
    if state.status_log.len() > MAX_STATUS_LOG {
        let excess = state.status_log.len() - MAX_STATUS_LOG;
        state.status_log.drain(0..excess);
    }
}
