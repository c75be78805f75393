use serde::{Deserialize, Serialize};

use crate::SocketId;

/// A member of a room as the clients see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Connection id of the member
    pub socket_id: SocketId,
    /// Display name of the member
    pub username: String,
}

/// Sent once to every new connection so that the client learns its own id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeEvent {
    pub socket_id: SocketId,
}

/// A user has joined the room, sent to every member including the newcomer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedEvent {
    /// Full member list of the room in join order
    pub clients: Vec<ClientInfo>,
    /// The username of the user that has joined
    pub username: String,
    /// The connection id of the user that has joined
    pub socket_id: SocketId,
    /// The language currently selected for the room
    pub language: String,
}

/// A user has left the room, sent to the remaining members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectedEvent {
    pub socket_id: SocketId,
    pub username: String,
}

/// New contents of the shared editor. Replaces whatever the receiver had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeEvent {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The language of the room has been changed by another member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChangeEvent {
    pub language: String,
}

/// The server refused a command of this connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEvent {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
/// Events that can be sent to the client
/// Events maybe related to different users, the receipient is a single connection
pub enum Event {
    Welcome(WelcomeEvent),
    Joined(JoinedEvent),
    Disconnected(DisconnectedEvent),
    CodeChange(CodeChangeEvent),
    LanguageChange(LanguageChangeEvent),
    Rejected(RejectedEvent),
}
