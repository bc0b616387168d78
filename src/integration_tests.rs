//! Integration tests for the chat client core
//!
//! These exercise full flows across modules: real-time events feeding the
//! chat state, optimistic sends, and the rendered timeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::clock::FixedClock;
use crate::events::{apply_event, process_events};
use crate::message::{ChatMessage, MessageStatus};
use crate::protocol::{ChannelEvent, ClientFrame, ServerFrame};
use crate::realtime::{memory_pair, RealtimeChannel};
use crate::state::ChatState;
use crate::timeline::{HighlightRequest, Locale, TimelineEntry};

fn clock() -> FixedClock {
    FixedClock::at(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 10, 15).unwrap()
}

fn rows(entries: &[TimelineEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match entry {
            TimelineEntry::Separator(sep) => format!("== {}", sep.label),
            TimelineEntry::Message(m) if m.highlighted => format!("* {}", m.message.render_key()),
            TimelineEntry::Message(m) => m.message.render_key().to_string(),
        })
        .collect()
}

/// Optimistic send: the provisional message sits at the bottom of today
/// until the ack arrives, then takes its place without changing its key.
#[test]
fn test_optimistic_send_flow() {
    let c = clock();
    let mut state = ChatState::new("p-1", Locale::Es);
    state.set_active("trip-1");

    for (id, ts) in [("1", "14/03/2024, 18:00"), ("2", "10:00")] {
        apply_event(
            &mut state,
            ChannelEvent::MessageReceived {
                chat_id: "trip-1".into(),
                message: ChatMessage::new(id, "d-1", "x", ts),
            },
            &c,
        );
    }

    let temp = state
        .ensure_conversation("trip-1")
        .push_provisional("p-1", "Ya bajo", &c)
        .unwrap();
    // A driver message timestamped earlier than "now" still lands above it
    apply_event(
        &mut state,
        ChannelEvent::MessageReceived {
            chat_id: "trip-1".into(),
            message: ChatMessage::new("3", "d-1", "x", "10:14"),
        },
        &c,
    );

    assert_eq!(
        rows(state.timeline("trip-1", &c)),
        vec!["== Ayer", "1", "== Hoy", "2", "3", temp.id.as_str()]
    );

    apply_event(
        &mut state,
        ChannelEvent::MessageConfirmed {
            chat_id: "trip-1".into(),
            temp_id: temp.id.clone(),
            message: ChatMessage::new("4", "p-1", "Ya bajo", "10:15")
                .with_status(MessageStatus::Delivered),
        },
        &c,
    );

    let entries = state.timeline("trip-1", &c).to_vec();
    assert_eq!(rows(&entries), vec!["== Ayer", "1", "== Hoy", "2", "3", temp.id.as_str()]);
    let last = entries.last().and_then(TimelineEntry::as_message).unwrap();
    assert_eq!(last.message.id, "4");
    assert!(!last.message.is_provisional());
}

#[test]
fn test_scroll_to_last_message_highlight() {
    let c = clock();
    let mut state = ChatState::new("d-1", Locale::En);
    let conv = state.ensure_conversation("trip-7");
    conv.add_message(ChatMessage::new("10", "p-1", "x", "13/03/2024, 09:00"), true);
    conv.add_message(ChatMessage::new("11", "p-1", "x", "10:00"), true);
    // Arrived last, but older than everything else
    conv.add_message(ChatMessage::new("12", "p-1", "x", "12/03/2024, 22:00"), true);

    state.request_highlight(HighlightRequest::from_storage(Some("[\"last\"]"), None));
    assert_eq!(
        rows(state.timeline("trip-7", &c)),
        vec!["== 12 March 2024", "* 12", "== 13 March 2024", "10", "== Today", "11"]
    );
}

/// Events flow from the in-memory server through the backend thread into
/// the chat state.
#[test]
fn test_realtime_to_timeline() {
    let c = clock();
    let (connector, server) = memory_pair();
    let channel = RealtimeChannel::spawn(Arc::new(connector)).unwrap();
    let mut state = ChatState::new("p-1", Locale::Es);

    channel.connect("ws://localhost:3000/socket", "p-1").unwrap();
    channel.join_chat("trip-1").unwrap();
    assert!(matches!(
        server.recv_timeout(Duration::from_secs(2)),
        Some(ClientFrame::JoinChat { .. })
    ));

    let temp = state
        .ensure_conversation("trip-1")
        .push_provisional("p-1", "Hola", &c)
        .unwrap();
    channel.send_message("trip-1", &temp).unwrap();
    let temp_id = match server.recv_timeout(Duration::from_secs(2)) {
        Some(ClientFrame::SendMessage { temp_id, .. }) => temp_id,
        other => panic!("Expected SendMessage frame, got {:?}", other),
    };

    server
        .push(&ServerFrame::MessageAck {
            chat_id: "trip-1".into(),
            temp_id,
            message: ChatMessage::new("100", "p-1", "Hola", "10:15")
                .with_status(MessageStatus::Sent),
        })
        .unwrap();
    server
        .push(&ServerFrame::NewMessage {
            chat_id: "trip-1".into(),
            message: ChatMessage::new("101", "d-1", "Voy", "10:16"),
        })
        .unwrap();

    // Connected + ack + new message
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    let mut applied = 0;
    while applied < 3 && std::time::Instant::now() < deadline {
        applied += process_events(channel.events(), &mut state, &c);
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(applied, 3);
    assert!(state.is_connected);

    let conv = &state.conversations["trip-1"];
    assert_eq!(conv.unread_count, 1);
    assert_eq!(
        rows(state.timeline("trip-1", &c)),
        vec!["== Hoy".to_string(), temp.id.clone(), "101".to_string()]
    );

    channel.shutdown();
}

#[test]
fn test_empty_conversation_renders_nothing() {
    let mut state = ChatState::new("p-1", Locale::Es);
    state.ensure_conversation("trip-1");
    state.request_highlight(HighlightRequest::last_message());
    assert!(state.timeline("trip-1", &clock()).is_empty());
}
