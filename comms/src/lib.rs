/// Set of commands which the server can receive and process
pub mod command;
/// Set of events the server sends to the members of a room
pub mod event;
/// Headless client-side view of a shared editor, driven by server events
pub mod replica;
/// Implementation of event and command transportation over TCP Streams.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;

/// Opaque identifier of a room, chosen by clients (usually a UUID).
pub type RoomId = String;

/// Identifier the server assigns to a single connection.
/// Unique for the lifetime of the server process.
pub type SocketId = String;

/// Language a room reports until somebody picks one.
pub const DEFAULT_LANGUAGE: &str = "javascript";
