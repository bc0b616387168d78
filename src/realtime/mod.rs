//! Real-time chat channel.
//!
//! `RealtimeChannel` is the single owned handle to the publish/subscribe
//! socket. It runs the socket on a background thread with its own Tokio
//! runtime and talks to it through crossbeam channels, so the UI thread never
//! blocks:
//! - `transport`: `Connector`/`Transport` traits and the in-memory transport
//! - `handlers`: UI action handling
//! - `main_loop`: the backend loop
mod handlers;
mod main_loop;
pub mod transport;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::message::ChatMessage;
use crate::protocol::{ChannelAction, ChannelEvent};
use crate::validation;

pub use main_loop::run_backend;
pub use transport::{memory_pair, ChannelError, Connector, MemoryConnector, MemoryServer, Transport};

pub struct RealtimeChannel {
    action_tx: Sender<ChannelAction>,
    event_rx: Receiver<ChannelEvent>,
    handle: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Start the backend thread. No connection is opened until `connect`.
    pub fn spawn(connector: Arc<dyn Connector>) -> Result<Self, ChannelError> {
        let (action_tx, action_rx) = unbounded::<ChannelAction>();
        let (event_tx, event_rx) = unbounded::<ChannelEvent>();

        let handle = thread::Builder::new()
            .name("drivup-realtime".into())
            .spawn(move || run_backend(action_rx, event_tx, connector))?;

        Ok(Self {
            action_tx,
            event_rx,
            handle: Some(handle),
        })
    }

    fn send(&self, action: ChannelAction) -> Result<(), ChannelError> {
        self.action_tx
            .send(action)
            .map_err(|_| ChannelError::BackendGone)
    }

    pub fn connect(&self, endpoint: &str, user_id: &str) -> Result<(), ChannelError> {
        validation::validate_endpoint(endpoint).map_err(ChannelError::Invalid)?;
        validation::validate_id(user_id).map_err(ChannelError::Invalid)?;
        self.send(ChannelAction::Connect {
            endpoint: endpoint.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn disconnect(&self) -> Result<(), ChannelError> {
        self.send(ChannelAction::Disconnect)
    }

    pub fn join_chat(&self, chat_id: &str) -> Result<(), ChannelError> {
        validation::validate_id(chat_id).map_err(ChannelError::Invalid)?;
        self.send(ChannelAction::JoinChat(chat_id.to_string()))
    }

    pub fn leave_chat(&self, chat_id: &str) -> Result<(), ChannelError> {
        self.send(ChannelAction::LeaveChat(chat_id.to_string()))
    }

    /// Send a message previously added with `Conversation::push_provisional`.
    pub fn send_message(
        &self,
        chat_id: &str,
        provisional: &ChatMessage,
    ) -> Result<(), ChannelError> {
        if !provisional.is_provisional() {
            return Err(ChannelError::Invalid(format!(
                "message {} is already confirmed",
                provisional.id
            )));
        }
        validation::validate_message(&provisional.text).map_err(ChannelError::Invalid)?;
        self.send(ChannelAction::SendMessage {
            chat_id: chat_id.to_string(),
            temp_id: provisional.id.clone(),
            text: provisional.text.clone(),
        })
    }

    pub fn mark_read(&self, chat_id: &str, message_ids: Vec<String>) -> Result<(), ChannelError> {
        if message_ids.is_empty() {
            return Ok(());
        }
        self.send(ChannelAction::MarkRead {
            chat_id: chat_id.to_string(),
            message_ids,
        })
    }

    /// Events produced by the backend, to be drained by `events::process_events`.
    pub fn events(&self) -> &Receiver<ChannelEvent> {
        &self.event_rx
    }

    /// Stop the backend thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.action_tx.send(ChannelAction::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("real-time backend thread panicked");
            }
        }
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.stop();
    }
}
