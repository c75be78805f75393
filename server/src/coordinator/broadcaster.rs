use std::collections::HashMap;

use comms::{
    event::{CodeChangeEvent, Event, LanguageChangeEvent},
    SocketId,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::registry::RoomRegistry;

/// Payloads a member can fan out to the rest of its room
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPayload {
    CodeChange {
        code: String,
        language: Option<String>,
    },
    LanguageChange {
        language: String,
    },
}

impl From<SyncPayload> for Event {
    fn from(payload: SyncPayload) -> Self {
        match payload {
            SyncPayload::CodeChange { code, language } => {
                Event::CodeChange(CodeChangeEvent { code, language })
            }
            SyncPayload::LanguageChange { language } => {
                Event::LanguageChange(LanguageChangeEvent { language })
            }
        }
    }
}

#[derive(Debug, Default)]
/// [SyncBroadcaster] owns the outbound mailbox of every live connection and
/// delivers events to them.
///
/// Delivery is best effort: a mailbox that is full or already closed loses the
/// event, nothing is retried. The next full document change supersedes it anyway.
pub struct SyncBroadcaster {
    mailboxes: HashMap<SocketId, mpsc::Sender<Event>>,
}

impl SyncBroadcaster {
    pub fn new() -> Self {
        SyncBroadcaster {
            mailboxes: HashMap::new(),
        }
    }

    pub fn register(&mut self, socket_id: &str, mailbox: mpsc::Sender<Event>) {
        self.mailboxes.insert(String::from(socket_id), mailbox);
    }

    /// Drop the mailbox of a connection. The session behind it sees its
    /// mailbox close once the queued events are drained.
    pub fn unregister(&mut self, socket_id: &str) -> bool {
        self.mailboxes.remove(socket_id).is_some()
    }

    /// Point to point delivery, returns whether the event was queued
    pub fn send_to(&self, socket_id: &str, event: Event) -> bool {
        let Some(mailbox) = self.mailboxes.get(socket_id) else {
            debug!(socket_id, "dropping event for unknown connection");
            return false;
        };

        match mailbox.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(socket_id, "mailbox full, event dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(socket_id, "mailbox closed, event dropped");
                false
            }
        }
    }

    /// Deliver `event` to every member of `room_id`, optionally skipping one connection.
    /// Returns the number of members the event was queued for.
    pub fn announce(
        &self,
        registry: &RoomRegistry,
        room_id: &str,
        except: Option<&str>,
        event: &Event,
    ) -> usize {
        registry
            .members_of(room_id)
            .iter()
            .filter(|member| Some(member.socket_id.as_str()) != except)
            .filter(|member| self.send_to(&member.socket_id, event.clone()))
            .count()
    }

    /// Fan a change from `source` out to everybody else in `room_id`
    pub fn broadcast(
        &self,
        registry: &RoomRegistry,
        source: &str,
        room_id: &str,
        payload: SyncPayload,
    ) -> usize {
        let event = Event::from(payload);
        let delivered = self.announce(registry, room_id, Some(source), &event);

        debug!(source, room_id, delivered, "broadcast");

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(
        broadcaster: &mut SyncBroadcaster,
        registry: &mut RoomRegistry,
        room_id: &str,
        socket_id: &str,
        capacity: usize,
    ) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(capacity);
        broadcaster.register(socket_id, tx);
        registry.add_member(room_id, socket_id, socket_id).unwrap();
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn code(code: &str) -> SyncPayload {
        SyncPayload::CodeChange {
            code: code.to_string(),
            language: None,
        }
    }

    #[test]
    fn test_broadcast_skips_source_and_other_rooms() {
        let mut broadcaster = SyncBroadcaster::new();
        let mut registry = RoomRegistry::new("javascript");
        let mut a = connect(&mut broadcaster, &mut registry, "r1", "a", 8);
        let mut b = connect(&mut broadcaster, &mut registry, "r1", "b", 8);
        let mut d = connect(&mut broadcaster, &mut registry, "r1", "d", 8);
        let mut c = connect(&mut broadcaster, &mut registry, "r2", "c", 8);

        let delivered = broadcaster.broadcast(&registry, "a", "r1", code("x=1"));

        let expected = Event::CodeChange(CodeChangeEvent {
            code: "x=1".to_string(),
            language: None,
        });
        assert_eq!(delivered, 2);
        assert!(drain(&mut a).is_empty());
        assert_eq!(drain(&mut b), vec![expected.clone()]);
        assert_eq!(drain(&mut d), vec![expected]);
        assert!(drain(&mut c).is_empty());
    }

    #[test]
    fn test_full_mailbox_drops_event() {
        let mut broadcaster = SyncBroadcaster::new();
        let mut registry = RoomRegistry::new("javascript");
        let _a = connect(&mut broadcaster, &mut registry, "r1", "a", 1);
        let mut b = connect(&mut broadcaster, &mut registry, "r1", "b", 1);

        assert_eq!(broadcaster.broadcast(&registry, "a", "r1", code("1")), 1);
        assert_eq!(broadcaster.broadcast(&registry, "a", "r1", code("2")), 0);

        let events = drain(&mut b);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::CodeChange(CodeChangeEvent {
                code: "1".to_string(),
                language: None,
            })
        );
    }

    #[test]
    fn test_send_to_unknown_or_closed_mailbox() {
        let mut broadcaster = SyncBroadcaster::new();
        let (tx, rx) = mpsc::channel(4);
        broadcaster.register("a", tx);
        drop(rx);

        let event = Event::from(SyncPayload::LanguageChange {
            language: "go".to_string(),
        });

        assert!(!broadcaster.send_to("a", event.clone()));
        assert!(!broadcaster.send_to("nobody", event));
        assert!(broadcaster.unregister("a"));
        assert!(!broadcaster.unregister("a"));
    }
}
