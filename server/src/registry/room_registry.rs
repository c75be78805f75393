use std::collections::HashMap;

use comms::{RoomId, SocketId};

use super::room::{Member, Room};
use crate::error::RegistryError;

/// [RoomRegistry] is the process wide map of rooms and their members.
///
/// Rooms are created implicitly by the first member and dropped as soon as the last one
/// leaves, so the registry never holds an empty room. Lookups on unknown rooms return
/// empty or default results.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    socket_to_room: HashMap<SocketId, RoomId>,
    default_language: String,
}

impl RoomRegistry {
    pub fn new(default_language: impl Into<String>) -> Self {
        RoomRegistry {
            rooms: HashMap::new(),
            socket_to_room: HashMap::new(),
            default_language: default_language.into(),
        }
    }

    /// Add a member to a room, creating the room if needed.
    /// A connection can only be a member of a single room at a time.
    pub fn add_member(
        &mut self,
        room_id: &str,
        socket_id: &str,
        username: &str,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.socket_to_room.get(socket_id) {
            return Err(RegistryError::DuplicateConnection {
                socket_id: String::from(socket_id),
                room_id: existing.clone(),
            });
        }

        let room = self
            .rooms
            .entry(String::from(room_id))
            .or_insert_with(Room::new);

        room.insert(Member {
            socket_id: String::from(socket_id),
            username: String::from(username),
            room_id: String::from(room_id),
        });
        self.socket_to_room
            .insert(String::from(socket_id), String::from(room_id));

        Ok(())
    }

    /// Remove a connection from whichever room it is in.
    /// Deletes the room when it becomes empty.
    ///
    /// # Returns
    ///
    /// The removed member, which carries the room it was removed from
    pub fn remove_member(&mut self, socket_id: &str) -> Option<Member> {
        let room_id = self.socket_to_room.remove(socket_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        let member = room.remove(socket_id);

        if room.is_empty() {
            self.rooms.remove(&room_id);
        }

        member
    }

    /// Snapshot of the members of a room in join order
    pub fn members_of(&self, room_id: &str) -> Vec<Member> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().cloned().collect())
            .unwrap_or_default()
    }

    /// Sets the language of a room, does nothing if the room does not exist
    pub fn set_language(&mut self, room_id: &str, language: &str) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.set_language(String::from(language));
        }
    }

    pub fn language_of(&self, room_id: &str) -> &str {
        self.rooms
            .get(room_id)
            .and_then(Room::language)
            .unwrap_or(self.default_language.as_str())
    }

    pub fn room_of(&self, socket_id: &str) -> Option<&str> {
        self.socket_to_room.get(socket_id).map(String::as_str)
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
