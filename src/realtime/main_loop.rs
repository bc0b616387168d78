//! Backend event loop for the real-time channel.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tokio::runtime::Runtime;
use tokio::time::timeout;

use crate::protocol::{ChannelAction, ChannelEvent};

use super::handlers::{self, Flow, Session};
use super::transport::{ChannelError, Connector};

/// How long a socket read may block before pending actions are checked.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the backend event loop on a tokio runtime.
///
/// Returns when a `Shutdown` action arrives or the action sender is dropped.
pub fn run_backend(
    action_rx: Receiver<ChannelAction>,
    event_tx: Sender<ChannelEvent>,
    connector: Arc<dyn Connector>,
) {
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(ChannelEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    rt.block_on(async move {
        let mut session: Option<Session> = None;
        let mut joined: BTreeSet<String> = BTreeSet::new();

        loop {
            // Drain actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(action) => {
                        let flow = handlers::handle_action(
                            action,
                            &mut session,
                            &mut joined,
                            connector.as_ref(),
                            &event_tx,
                        )
                        .await;
                        if flow == Flow::Exit {
                            tracing::debug!("real-time backend shutting down");
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        handlers::close_session(&mut session).await;
                        return;
                    }
                }
            }

            // Read from the socket with a short timeout so actions stay responsive
            let Some(s) = session.as_mut() else {
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            };

            match timeout(POLL_INTERVAL, s.transport.recv()).await {
                Ok(Ok(Some(frame))) => {
                    let _ = event_tx.send(frame.into_event());
                }
                Ok(Ok(None)) => {
                    session = None;
                    let _ = event_tx.send(ChannelEvent::Disconnected(
                        "Connection closed by server".into(),
                    ));
                }
                Ok(Err(ChannelError::Codec(e))) => {
                    // One bad frame does not kill the connection
                    tracing::warn!(error = %e, "dropping malformed server frame");
                    let _ = event_tx.send(ChannelEvent::Error(format!("Malformed frame: {}", e)));
                }
                Ok(Err(e)) => {
                    let _ = event_tx.send(ChannelEvent::Error(format!("Read error: {}", e)));
                    session = None;
                    let _ = event_tx.send(ChannelEvent::Disconnected("Read error".into()));
                }
                Err(_) => {
                    // Timeout - normal, loop
                }
            }
        }
    });
}
