use std::collections::HashMap;

use comms::{
    command::{
        CodeChangeCommand, JoinCommand, LanguageChangeCommand, SyncCodeCommand, UserCommand,
    },
    event::{
        CodeChangeEvent, DisconnectedEvent, Event, JoinedEvent, RejectedEvent, WelcomeEvent,
    },
    RoomId, SocketId,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::broadcaster::{SyncBroadcaster, SyncPayload};
use crate::{
    error::JoinError,
    registry::{Member, RoomRegistry},
};

/// Where a single connection is in its lifecycle.
/// Connections that are gone have no entry at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Welcomed but not in a room yet, or left its room
    Connected,
    Joined { room_id: RoomId },
}

/// [SessionCoordinator] applies the commands of every connection to the [RoomRegistry]
/// and decides who gets told about it.
///
/// Every handler runs to completion without awaiting, the coordinator is the only
/// owner of the registry so no locking is involved.
#[derive(Debug)]
pub struct SessionCoordinator {
    registry: RoomRegistry,
    broadcaster: SyncBroadcaster,
    connections: HashMap<SocketId, ConnectionState>,
}

impl SessionCoordinator {
    pub fn new(default_language: impl Into<String>) -> Self {
        SessionCoordinator {
            registry: RoomRegistry::new(default_language),
            broadcaster: SyncBroadcaster::new(),
            connections: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn connection_state(&self, socket_id: &str) -> Option<&ConnectionState> {
        self.connections.get(socket_id)
    }

    /// Register the outbound mailbox of a new connection and welcome it
    pub fn connect(&mut self, socket_id: &str, mailbox: mpsc::Sender<Event>) {
        self.broadcaster.register(socket_id, mailbox);
        self.connections
            .insert(String::from(socket_id), ConnectionState::Connected);

        self.broadcaster.send_to(
            socket_id,
            Event::Welcome(WelcomeEvent {
                socket_id: String::from(socket_id),
            }),
        );

        info!(socket_id, "connection opened");
    }

    /// Dispatch a command received from `socket_id`
    pub fn handle_command(&mut self, socket_id: &str, command: UserCommand) {
        match command {
            UserCommand::Join(cmd) => {
                if let Err(err) = self.join(socket_id, cmd) {
                    warn!(socket_id, %err, "join rejected");
                    self.broadcaster.send_to(
                        socket_id,
                        Event::Rejected(RejectedEvent {
                            reason: err.to_string(),
                        }),
                    );

                    if err.is_fatal() {
                        self.disconnect(socket_id);
                    }
                }
            }
            UserCommand::CodeChange(cmd) => self.code_change(socket_id, cmd),
            UserCommand::LanguageChange(cmd) => self.language_change(socket_id, cmd),
            UserCommand::SyncCode(cmd) => self.sync_code(socket_id, cmd),
            UserCommand::Leave(_) => {
                self.leave(socket_id);
            }
            UserCommand::Quit(_) => self.disconnect(socket_id),
        }
    }

    /// Add the connection to a room and announce the new member list to everybody in it,
    /// the newcomer included.
    pub fn join(&mut self, socket_id: &str, cmd: JoinCommand) -> Result<(), JoinError> {
        let room_id = cmd.room_id.trim();
        let username = cmd.username.trim();

        if room_id.is_empty() {
            return Err(JoinError::EmptyRoomId);
        }
        if username.is_empty() {
            return Err(JoinError::EmptyUsername);
        }

        match self.connections.get(socket_id) {
            None => return Err(JoinError::NotConnected(String::from(socket_id))),
            Some(ConnectionState::Joined { room_id }) => {
                return Err(JoinError::AlreadyJoined(room_id.clone()))
            }
            Some(ConnectionState::Connected) => {}
        }

        let is_new_room = !self.registry.contains_room(room_id);
        self.registry.add_member(room_id, socket_id, username)?;

        // the first member decides the language, later joiners adopt it
        if is_new_room {
            if let Some(language) = cmd.language.as_deref().filter(|l| !l.trim().is_empty()) {
                self.registry.set_language(room_id, language);
            }
        }

        self.connections.insert(
            String::from(socket_id),
            ConnectionState::Joined {
                room_id: String::from(room_id),
            },
        );

        let clients = self
            .registry
            .members_of(room_id)
            .iter()
            .map(Member::client_info)
            .collect::<Vec<_>>();

        info!(socket_id, room_id, username, members = clients.len(), "joined room");

        let event = Event::Joined(JoinedEvent {
            clients,
            username: String::from(username),
            socket_id: String::from(socket_id),
            language: String::from(self.registry.language_of(room_id)),
        });
        self.broadcaster
            .announce(&self.registry, room_id, None, &event);

        Ok(())
    }

    /// Remove the connection from its room and tell the remaining members.
    /// The connection itself stays open.
    pub fn leave(&mut self, socket_id: &str) -> Option<Member> {
        let member = self.registry.remove_member(socket_id)?;

        if let Some(state) = self.connections.get_mut(socket_id) {
            *state = ConnectionState::Connected;
        }

        info!(socket_id, room_id = %member.room_id, "left room");

        self.broadcaster.announce(
            &self.registry,
            &member.room_id,
            None,
            &Event::Disconnected(DisconnectedEvent {
                socket_id: member.socket_id.clone(),
                username: member.username.clone(),
            }),
        );

        Some(member)
    }

    /// Forget a connection entirely. Safe to call more than once.
    pub fn disconnect(&mut self, socket_id: &str) {
        self.leave(socket_id);

        let was_connected = self.connections.remove(socket_id).is_some();
        self.broadcaster.unregister(socket_id);

        if was_connected {
            info!(socket_id, "connection closed");
        }
    }

    fn code_change(&mut self, socket_id: &str, cmd: CodeChangeCommand) {
        let Some(room_id) = self.joined_room(socket_id, &cmd.room_id) else {
            return;
        };

        self.broadcaster.broadcast(
            &self.registry,
            socket_id,
            &room_id,
            SyncPayload::CodeChange {
                code: cmd.code,
                language: cmd.language,
            },
        );
    }

    fn language_change(&mut self, socket_id: &str, cmd: LanguageChangeCommand) {
        let Some(room_id) = self.joined_room(socket_id, &cmd.room_id) else {
            return;
        };

        if cmd.language.trim().is_empty() {
            warn!(socket_id, "ignoring empty language");
            return;
        }

        // stored first so that anybody joining later sees it
        self.registry.set_language(&room_id, &cmd.language);
        self.broadcaster.broadcast(
            &self.registry,
            socket_id,
            &room_id,
            SyncPayload::LanguageChange {
                language: cmd.language,
            },
        );
    }

    /// Forward the sender's code to a single member of the same room.
    /// A target that is gone or in another room is silently skipped.
    fn sync_code(&mut self, socket_id: &str, cmd: SyncCodeCommand) {
        let Some(source_room) = self.registry.room_of(socket_id) else {
            warn!(socket_id, "sync from a connection that has not joined");
            return;
        };

        if self.registry.room_of(&cmd.socket_id) != Some(source_room) {
            debug!(socket_id, target = %cmd.socket_id, "sync target is not in the room");
            return;
        }

        self.broadcaster.send_to(
            &cmd.socket_id,
            Event::CodeChange(CodeChangeEvent {
                code: cmd.code,
                language: cmd.language,
            }),
        );
    }

    /// The room `socket_id` has joined, if it matches the room named by the command
    fn joined_room(&self, socket_id: &str, claimed_room: &str) -> Option<RoomId> {
        let room_id = self.registry.room_of(socket_id);

        if room_id != Some(claimed_room.trim()) {
            warn!(
                socket_id,
                claimed_room,
                joined_room = room_id.unwrap_or("-"),
                "dropping change for a room the connection is not in"
            );
            return None;
        }

        room_id.map(String::from)
    }
}
