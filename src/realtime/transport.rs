//! Transport abstraction for the real-time channel.
//!
//! The production socket lives outside this crate; it plugs in through
//! `Connector`. `memory_pair` provides an in-process transport that speaks the
//! same JSON frames, used by tests and local demos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tokio::sync::mpsc;

use crate::protocol::{ClientFrame, ServerFrame};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("not connected")]
    NotConnected,
    #[error("connection closed")]
    Closed,
    #[error("malformed frame: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("real-time backend is not running")]
    BackendGone,
    #[error("failed to start backend thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// An open, bidirectional frame stream.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: ClientFrame) -> Result<(), ChannelError>;

    /// Next frame from the server; `Ok(None)` once the server hung up.
    ///
    /// Must be cancel safe: the backend polls it under a timeout.
    async fn recv(&mut self) -> Result<Option<ServerFrame>, ChannelError>;

    async fn close(&mut self) -> Result<(), ChannelError>;
}

/// Opens transports.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        endpoint: &str,
        user_id: &str,
    ) -> Result<Box<dyn Transport>, ChannelError>;
}

#[derive(Default)]
struct MemoryShared {
    to_client: Mutex<Option<mpsc::UnboundedSender<String>>>,
    refuse: AtomicBool,
    connections: AtomicUsize,
    last_user: Mutex<Option<String>>,
}

/// Create a connected in-memory connector / server pair.
pub fn memory_pair() -> (MemoryConnector, MemoryServer) {
    let shared = Arc::new(MemoryShared::default());
    let (from_client_tx, from_client_rx) = unbounded();
    (
        MemoryConnector {
            shared: Arc::clone(&shared),
            from_client: from_client_tx,
        },
        MemoryServer {
            shared,
            from_client: from_client_rx,
        },
    )
}

pub struct MemoryConnector {
    shared: Arc<MemoryShared>,
    from_client: Sender<String>,
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        endpoint: &str,
        user_id: &str,
    ) -> Result<Box<dyn Transport>, ChannelError> {
        if self.shared.refuse.load(Ordering::SeqCst) {
            return Err(ChannelError::Connect(format!("{} refused the connection", endpoint)));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut slot) = self.shared.to_client.lock() {
            *slot = Some(tx);
        }
        if let Ok(mut last) = self.shared.last_user.lock() {
            *last = Some(user_id.to_string());
        }
        self.shared.connections.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryTransport {
            inbound: rx,
            outbound: self.from_client.clone(),
        }))
    }
}

struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: Sender<String>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, frame: ClientFrame) -> Result<(), ChannelError> {
        let raw = serde_json::to_string(&frame)?;
        self.outbound.send(raw).map_err(|_| ChannelError::Closed)
    }

    async fn recv(&mut self) -> Result<Option<ServerFrame>, ChannelError> {
        match self.inbound.recv().await {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.inbound.close();
        Ok(())
    }
}

/// Server side of an in-memory transport. Fully synchronous.
pub struct MemoryServer {
    shared: Arc<MemoryShared>,
    from_client: Receiver<String>,
}

impl MemoryServer {
    pub fn push(&self, frame: &ServerFrame) -> Result<(), ChannelError> {
        let raw = serde_json::to_string(frame)?;
        self.push_raw(&raw)
    }

    /// Push an arbitrary payload, valid JSON or not.
    pub fn push_raw(&self, raw: &str) -> Result<(), ChannelError> {
        let slot = self.shared.to_client.lock().map_err(|_| ChannelError::Closed)?;
        let tx = slot.as_ref().ok_or(ChannelError::NotConnected)?;
        tx.send(raw.to_string()).map_err(|_| ChannelError::Closed)
    }

    /// Next frame written by the client, if one arrives within `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientFrame> {
        let raw = self.from_client.recv_timeout(timeout).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Drop the current connection from the server side.
    pub fn hang_up(&self) {
        if let Ok(mut slot) = self.shared.to_client.lock() {
            slot.take();
        }
    }

    /// Make subsequent connection attempts fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.shared.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn connection_count(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    pub fn last_user(&self) -> Option<String> {
        self.shared.last_user.lock().ok().and_then(|u| u.clone())
    }
}
