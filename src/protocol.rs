use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, MessageStatus};

/// Actions sent from the UI to the real-time backend
#[derive(Debug, Clone)]
pub enum ChannelAction {
    /// Open the socket for this user
    Connect { endpoint: String, user_id: String },
    /// Close the socket, keeping the backend thread alive
    Disconnect,
    /// Start receiving events of a chat
    JoinChat(String),
    /// Stop receiving events of a chat
    LeaveChat(String),
    /// Send a message that is already shown provisionally
    SendMessage {
        chat_id: String,
        temp_id: String,
        text: String,
    },
    /// Tell the peer we have seen these messages
    MarkRead { chat_id: String, message_ids: Vec<String> },
    /// Stop the backend thread
    Shutdown,
}

/// Events sent from the real-time backend to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Socket is open
    Connected,
    /// Socket closed, with the reason
    Disconnected(String),
    /// Transport or protocol error
    Error(String),
    /// A new message was posted in a chat
    MessageReceived { chat_id: String, message: ChatMessage },
    /// The server stored one of our provisional messages
    MessageConfirmed {
        chat_id: String,
        temp_id: String,
        message: ChatMessage,
    },
    /// Delivery status changed for a message
    StatusChanged {
        chat_id: String,
        message_id: String,
        status: MessageStatus,
    },
    /// `reader_id` opened the chat and saw everything sent to them
    ChatRead { chat_id: String, reader_id: String },
}

/// Frames the client writes to the socket.
///
/// Serialized as `{ "type": "...", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    JoinChat { chat_id: String, user_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveChat { chat_id: String, user_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        chat_id: String,
        temp_id: String,
        sender_id: String,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    MarkRead {
        chat_id: String,
        reader_id: String,
        message_ids: Vec<String>,
    },
}

/// Frames the server pushes to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerFrame {
    #[serde(rename_all = "camelCase")]
    NewMessage { chat_id: String, message: ChatMessage },
    #[serde(rename_all = "camelCase")]
    MessageAck {
        chat_id: String,
        temp_id: String,
        message: ChatMessage,
    },
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        chat_id: String,
        message_id: String,
        status: MessageStatus,
    },
    #[serde(rename_all = "camelCase")]
    ChatRead { chat_id: String, reader_id: String },
    Error { message: String },
}

impl ServerFrame {
    /// Translate a server frame into the event the UI consumes.
    pub fn into_event(self) -> ChannelEvent {
        match self {
            ServerFrame::NewMessage { chat_id, message } => {
                ChannelEvent::MessageReceived { chat_id, message }
            }
            ServerFrame::MessageAck { chat_id, temp_id, message } => {
                ChannelEvent::MessageConfirmed { chat_id, temp_id, message }
            }
            ServerFrame::StatusUpdate { chat_id, message_id, status } => {
                ChannelEvent::StatusChanged { chat_id, message_id, status }
            }
            ServerFrame::ChatRead { chat_id, reader_id } => {
                ChannelEvent::ChatRead { chat_id, reader_id }
            }
            ServerFrame::Error { message } => ChannelEvent::Error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frame_envelope() {
        let frame = ClientFrame::SendMessage {
            chat_id: "trip-12".into(),
            temp_id: "temp-1".into(),
            sender_id: "p-1".into(),
            text: "¿Dónde estás?".into(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "sendMessage");
        assert_eq!(json["data"]["chatId"], "trip-12");
        assert_eq!(json["data"]["tempId"], "temp-1");
    }

    #[test]
    fn test_server_frame_to_event() {
        let raw = r#"{"type":"statusUpdate","data":{
            "chatId":"trip-12","messageId":"8","status":"read"}}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(
            frame.into_event(),
            ChannelEvent::StatusChanged {
                chat_id: "trip-12".into(),
                message_id: "8".into(),
                status: MessageStatus::Read,
            }
        );

        let raw = r#"{"type":"newMessage","data":{"chatId":"trip-12",
            "message":{"id":"9","senderId":"d-1","text":"Llegando","timestamp":"10:00"}}}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame.into_event() {
            ChannelEvent::MessageReceived { chat_id, message } => {
                assert_eq!(chat_id, "trip-12");
                assert_eq!(message.id, "9");
            }
            other => panic!("Expected MessageReceived, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_read_frame() {
        let raw = r#"{"type":"chatRead","data":{"chatId":"trip-12","readerId":"d-1"}}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(
            frame.into_event(),
            ChannelEvent::ChatRead {
                chat_id: "trip-12".into(),
                reader_id: "d-1".into(),
            }
        );
    }
}
