use anyhow::Context;
use comms::{command::UserCommand, event::Event, SocketId};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::info;

pub use self::broadcaster::{SyncBroadcaster, SyncPayload};
pub use self::session_coordinator::{ConnectionState, SessionCoordinator};

mod broadcaster;
mod session_coordinator;

/// Messages connection tasks send to the coordinator task
#[derive(Debug)]
pub enum CoordinatorMessage {
    Connect {
        socket_id: SocketId,
        mailbox: mpsc::Sender<Event>,
    },
    Command {
        socket_id: SocketId,
        command: UserCommand,
    },
    Disconnect {
        socket_id: SocketId,
    },
}

#[derive(Debug, Clone)]
/// [CoordinatorHandle] is the cheap, cloneable way for a session to reach the coordinator.
/// All messages go through one queue and are handled in arrival order.
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorMessage>,
}

impl CoordinatorHandle {
    pub async fn connect(&self, socket_id: &str, mailbox: mpsc::Sender<Event>) -> anyhow::Result<()> {
        self.send(CoordinatorMessage::Connect {
            socket_id: String::from(socket_id),
            mailbox,
        })
        .await
    }

    pub async fn command(&self, socket_id: &str, command: UserCommand) -> anyhow::Result<()> {
        self.send(CoordinatorMessage::Command {
            socket_id: String::from(socket_id),
            command,
        })
        .await
    }

    pub async fn disconnect(&self, socket_id: &str) -> anyhow::Result<()> {
        self.send(CoordinatorMessage::Disconnect {
            socket_id: String::from(socket_id),
        })
        .await
    }

    async fn send(&self, message: CoordinatorMessage) -> anyhow::Result<()> {
        self.tx
            .send(message)
            .await
            .context("coordinator is no longer running")
    }
}

/// Start the coordinator on its own task.
/// The task finishes once every [CoordinatorHandle] has been dropped.
pub fn spawn(coordinator: SessionCoordinator, inbox_capacity: usize) -> (CoordinatorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(inbox_capacity);
    let join_handle = tokio::spawn(run(coordinator, rx));

    (CoordinatorHandle { tx }, join_handle)
}

async fn run(mut coordinator: SessionCoordinator, mut rx: mpsc::Receiver<CoordinatorMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            CoordinatorMessage::Connect { socket_id, mailbox } => {
                coordinator.connect(&socket_id, mailbox)
            }
            CoordinatorMessage::Command { socket_id, command } => {
                coordinator.handle_command(&socket_id, command)
            }
            CoordinatorMessage::Disconnect { socket_id } => coordinator.disconnect(&socket_id),
        }
    }

    info!(
        rooms = coordinator.registry().room_count(),
        "coordinator stopped"
    );
}
