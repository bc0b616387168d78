//! Handling of UI actions inside the backend loop.

use std::collections::BTreeSet;

use crossbeam_channel::Sender;

use crate::protocol::{ChannelAction, ChannelEvent, ClientFrame};

use super::transport::{ChannelError, Connector, Transport};

/// An open connection and the user it belongs to.
pub(super) struct Session {
    pub transport: Box<dyn Transport>,
    pub user_id: String,
}

/// Whether the backend loop keeps running after an action.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Exit,
}

/// Close the current session, if any. Returns whether one was open.
pub(super) async fn close_session(session: &mut Option<Session>) -> bool {
    let Some(mut s) = session.take() else {
        return false;
    };
    if let Err(e) = s.transport.close().await {
        tracing::debug!(error = %e, "error while closing transport");
    }
    true
}

pub(super) async fn handle_action(
    action: ChannelAction,
    session: &mut Option<Session>,
    joined: &mut BTreeSet<String>,
    connector: &dyn Connector,
    event_tx: &Sender<ChannelEvent>,
) -> Flow {
    match action {
        ChannelAction::Connect { endpoint, user_id } => {
            close_session(session).await;
            tracing::info!(%endpoint, %user_id, "connecting real-time channel");

            match connector.connect(&endpoint, &user_id).await {
                Ok(transport) => {
                    let mut s = Session { transport, user_id };
                    let _ = event_tx.send(ChannelEvent::Connected);

                    // Resubscribe after a dropped connection
                    for chat_id in joined.iter() {
                        let frame = ClientFrame::JoinChat {
                            chat_id: chat_id.clone(),
                            user_id: s.user_id.clone(),
                        };
                        if let Err(e) = s.transport.send(frame).await {
                            let _ = event_tx.send(ChannelEvent::Error(format!(
                                "Failed to rejoin {}: {}",
                                chat_id, e
                            )));
                        }
                    }
                    *session = Some(s);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "real-time connection failed");
                    let _ = event_tx.send(ChannelEvent::Error(e.to_string()));
                }
            }
        }

        ChannelAction::Disconnect => {
            joined.clear();
            let reason = if close_session(session).await {
                "Client disconnected"
            } else {
                "Not connected"
            };
            let _ = event_tx.send(ChannelEvent::Disconnected(reason.into()));
        }

        ChannelAction::JoinChat(chat_id) => {
            joined.insert(chat_id.clone());
            send_frame(session, event_tx, |user_id| ClientFrame::JoinChat {
                chat_id,
                user_id,
            })
            .await;
        }

        ChannelAction::LeaveChat(chat_id) => {
            joined.remove(&chat_id);
            send_frame(session, event_tx, |user_id| ClientFrame::LeaveChat {
                chat_id,
                user_id,
            })
            .await;
        }

        ChannelAction::SendMessage { chat_id, temp_id, text } => {
            send_frame(session, event_tx, |sender_id| ClientFrame::SendMessage {
                chat_id,
                temp_id,
                sender_id,
                text,
            })
            .await;
        }

        ChannelAction::MarkRead { chat_id, message_ids } => {
            send_frame(session, event_tx, |reader_id| ClientFrame::MarkRead {
                chat_id,
                reader_id,
                message_ids,
            })
            .await;
        }

        ChannelAction::Shutdown => {
            close_session(session).await;
            return Flow::Exit;
        }
    }

    Flow::Continue
}

/// Build a frame for the connected user and write it, reporting failures as
/// events. A write failure drops the session.
async fn send_frame<F>(session: &mut Option<Session>, event_tx: &Sender<ChannelEvent>, build: F)
where
    F: FnOnce(String) -> ClientFrame + Send,
{
    let Some(s) = session.as_mut() else {
        let _ = event_tx.send(ChannelEvent::Error(ChannelError::NotConnected.to_string()));
        return;
    };

    let frame = build(s.user_id.clone());
    match s.transport.send(frame).await {
        Ok(()) => {}
        Err(ChannelError::Codec(e)) => {
            let _ = event_tx.send(ChannelEvent::Error(format!("Failed to encode frame: {}", e)));
        }
        Err(e) => {
            tracing::warn!(error = %e, "write failed, dropping connection");
            close_session(session).await;
            let _ = event_tx.send(ChannelEvent::Disconnected(format!("Write error: {}", e)));
        }
    }
}
