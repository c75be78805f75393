use serde::{Deserialize, Serialize};

use crate::{RoomId, SocketId};

/// User Command for joining a room. The room is created if nobody is in it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCommand {
    // The room to join.
    pub room_id: RoomId,
    // Display name, not required to be unique.
    pub username: String,
    // Language the client currently has selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// User Command carrying the full editor contents after a local edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeCommand {
    pub room_id: RoomId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// User Command for switching the language of the whole room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChangeCommand {
    pub room_id: RoomId,
    pub language: String,
}

/// User Command for handing the current code to a single member of the room,
/// used to bring a newcomer up to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCodeCommand {
    // The connection that should receive the code.
    pub socket_id: SocketId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// User Command for leaving the current room while keeping the connection open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveCommand;

/// User Command for quitting the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitCommand;

/// A user command which can be sent to the server by a single connection.
/// All commands are processed in the context of the room the connection has joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum UserCommand {
    Join(JoinCommand),
    CodeChange(CodeChangeCommand),
    LanguageChange(LanguageChangeCommand),
    SyncCode(SyncCodeCommand),
    Leave(LeaveCommand),
    Quit(QuitCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &UserCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: UserCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    #[test]
    fn test_join_command() {
        let command = UserCommand::Join(JoinCommand {
            room_id: "r1".to_string(),
            username: "alice".to_string(),
            language: Some("rust".to_string()),
        });

        assert_command_serialization(
            &command,
            r#"{"t":"join","roomId":"r1","username":"alice","language":"rust"}"#,
        );
    }

    #[test]
    fn test_join_command_without_language() {
        let command: UserCommand =
            serde_json::from_str(r#"{"t":"join","roomId":"r1","username":"bob"}"#).unwrap();

        assert_eq!(
            command,
            UserCommand::Join(JoinCommand {
                room_id: "r1".to_string(),
                username: "bob".to_string(),
                language: None,
            })
        );
    }

    #[test]
    fn test_code_change_command() {
        let command = UserCommand::CodeChange(CodeChangeCommand {
            room_id: "r1".to_string(),
            code: "x=1".to_string(),
            language: Some("python".to_string()),
        });

        assert_command_serialization(
            &command,
            r#"{"t":"code_change","roomId":"r1","code":"x=1","language":"python"}"#,
        );
    }

    #[test]
    fn test_language_change_command() {
        let command = UserCommand::LanguageChange(LanguageChangeCommand {
            room_id: "r1".to_string(),
            language: "go".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"t":"language_change","roomId":"r1","language":"go"}"#,
        );
    }

    #[test]
    fn test_sync_code_command() {
        let command = UserCommand::SyncCode(SyncCodeCommand {
            socket_id: "abc".to_string(),
            code: "console.log(1)".to_string(),
            language: None,
        });

        assert_command_serialization(
            &command,
            r#"{"t":"sync_code","socketId":"abc","code":"console.log(1)"}"#,
        );
    }

    #[test]
    fn test_leave_command() {
        assert_command_serialization(&UserCommand::Leave(LeaveCommand), r#"{"t":"leave"}"#);
    }

    #[test]
    fn test_quit_command() {
        assert_command_serialization(&UserCommand::Quit(QuitCommand), r#"{"t":"quit"}"#);
    }
}
