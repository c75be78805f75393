use comms::{event::ClientInfo, RoomId, SocketId};
use indexmap::IndexMap;

/// A single connection participating in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub socket_id: SocketId,
    pub username: String,
    /// The room this member belongs to, by identifier only
    pub room_id: RoomId,
}

impl Member {
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            socket_id: self.socket_id.clone(),
            username: self.username.clone(),
        }
    }
}

#[derive(Debug, Default)]
/// [Room] keeps the members of a single collaboration session in join order
/// alongside the language selected for the shared buffer.
pub struct Room {
    members: IndexMap<SocketId, Member>,
    language: Option<String>,
}

impl Room {
    pub fn new() -> Self {
        Room {
            members: IndexMap::new(),
            language: None,
        }
    }

    /// Add a member, returns false if the connection was already in the room
    pub(super) fn insert(&mut self, member: Member) -> bool {
        if self.members.contains_key(&member.socket_id) {
            return false;
        }

        self.members.insert(member.socket_id.clone(), member);
        true
    }

    /// Remove a member while keeping the join order of everybody else
    pub(super) fn remove(&mut self, socket_id: &str) -> Option<Member> {
        self.members.shift_remove(socket_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub(super) fn set_language(&mut self, language: String) {
        self.language = Some(language);
    }
}
