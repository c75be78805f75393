use crate::{
    command::{
        CodeChangeCommand, JoinCommand, LanguageChangeCommand, SyncCodeCommand, UserCommand,
    },
    event::{ClientInfo, Event},
    RoomId, SocketId, DEFAULT_LANGUAGE,
};

/// [EditorReplica] holds what a single client knows about the room it is editing in.
///
/// It does no I/O. Server events are folded in with [EditorReplica::apply] and local
/// edits with [EditorReplica::edit]; both return the commands the client has to send.
/// Code is replaced wholesale on every incoming change, the last change applied wins.
#[derive(Debug, Clone)]
pub struct EditorReplica {
    /// Connection id assigned by the server, known after the welcome event
    pub socket_id: Option<SocketId>,
    pub username: String,
    pub room_id: RoomId,
    /// Current contents of the editor
    pub code: String,
    /// Currently selected language
    pub language: String,
    /// Members of the room in join order
    pub clients: Vec<ClientInfo>,
}

impl EditorReplica {
    pub fn new(room_id: impl Into<RoomId>, username: impl Into<String>) -> Self {
        EditorReplica {
            socket_id: None,
            username: username.into(),
            room_id: room_id.into(),
            code: String::new(),
            language: String::from(DEFAULT_LANGUAGE),
            clients: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn join_command(&self) -> UserCommand {
        UserCommand::Join(JoinCommand {
            room_id: self.room_id.clone(),
            username: self.username.clone(),
            language: Some(self.language.clone()),
        })
    }

    /// Fold a server event into the replica.
    ///
    /// # Returns
    ///
    /// Commands to send back to the server in response, e.g. handing the current
    /// code to a member that just joined.
    pub fn apply(&mut self, event: &Event) -> Vec<UserCommand> {
        match event {
            Event::Welcome(event) => {
                self.socket_id = Some(event.socket_id.clone());
            }
            Event::Joined(event) => {
                self.clients = event.clients.clone();
                self.language = event.language.clone();

                let is_self = self.socket_id.as_deref() == Some(event.socket_id.as_str());
                // an empty buffer has nothing to offer and would only clobber a better answer
                if !is_self && !self.code.is_empty() {
                    return vec![UserCommand::SyncCode(SyncCodeCommand {
                        socket_id: event.socket_id.clone(),
                        code: self.code.clone(),
                        language: Some(self.language.clone()),
                    })];
                }
            }
            Event::Disconnected(event) => {
                self.clients
                    .retain(|client| client.socket_id != event.socket_id);
            }
            // the room language only follows joined and language_change, a code change
            // sent before a language switch may arrive after it
            Event::CodeChange(event) => {
                self.code = event.code.clone();
            }
            Event::LanguageChange(event) => {
                self.language = event.language.clone();
            }
            Event::Rejected(_) => {}
        }

        Vec::new()
    }

    /// Replace the local code and produce the change to broadcast to the room
    pub fn edit(&mut self, code: impl Into<String>) -> UserCommand {
        self.code = code.into();

        UserCommand::CodeChange(CodeChangeCommand {
            room_id: self.room_id.clone(),
            code: self.code.clone(),
            language: Some(self.language.clone()),
        })
    }

    pub fn select_language(&mut self, language: impl Into<String>) -> UserCommand {
        self.language = language.into();

        UserCommand::LanguageChange(LanguageChangeCommand {
            room_id: self.room_id.clone(),
            language: self.language.clone(),
        })
    }

    pub fn usernames(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.username.as_str()).collect()
    }
}
