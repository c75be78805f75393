use comms::{RoomId, SocketId};
use thiserror::Error;

/// Failures of the [crate::registry::RoomRegistry]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{socket_id}' is already a member of room '{room_id}'")]
    DuplicateConnection { socket_id: SocketId, room_id: RoomId },
}

/// Reasons a join request is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room id must not be empty")]
    EmptyRoomId,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("already joined room '{0}'")]
    AlreadyJoined(RoomId),
    #[error("connection '{0}' is not connected")]
    NotConnected(SocketId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl JoinError {
    /// Whether the connection should be closed after reporting this error.
    /// A client that asked for an invalid room is expected to navigate away.
    pub fn is_fatal(&self) -> bool {
        matches!(self, JoinError::EmptyRoomId | JoinError::EmptyUsername)
    }
}
