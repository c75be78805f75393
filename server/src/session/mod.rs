use comms::{command::UserCommand, transport};
use nanoid::nanoid;
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc},
};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::coordinator::CoordinatorHandle;

/// How a session loop came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The client quit, hung up, or the coordinator closed the connection
    Closed,
    /// The server is shutting down
    Shutdown,
}

/// Given a tcp stream and a coordinator, handles the user session
/// until the user quits the session, or the tcp stream is closed for some reason, or the server shuts down
pub async fn handle_user_session(
    coordinator: CoordinatorHandle,
    mailbox_capacity: usize,
    quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<()> {
    // Connection ids only need to be unique, there is no login system
    let socket_id = nanoid!();
    let (mailbox_tx, mailbox_rx) = mpsc::channel(mailbox_capacity);

    coordinator.connect(&socket_id, mailbox_tx).await?;

    let outcome = drive_session(&coordinator, &socket_id, mailbox_rx, quit_rx, stream).await;

    // Leaving the room notifies the others, unless the whole server is going away
    let disconnected = match outcome {
        Ok(SessionEnd::Shutdown) => Ok(()),
        _ => coordinator.disconnect(&socket_id).await,
    };

    finish_session(&socket_id, outcome, disconnected)
}

/// Report the session's own failure first, a failed disconnect only when the session ended cleanly
fn finish_session(
    socket_id: &str,
    outcome: anyhow::Result<SessionEnd>,
    disconnected: anyhow::Result<()>,
) -> anyhow::Result<()> {
    match (outcome, disconnected) {
        (Err(err), Err(disconnect_err)) => {
            warn!(socket_id, "could not disconnect after failure: {:#}", disconnect_err);
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(_), disconnected) => disconnected,
    }
}

async fn drive_session(
    coordinator: &CoordinatorHandle,
    socket_id: &str,
    mut mailbox_rx: mpsc::Receiver<comms::event::Event>,
    mut quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<SessionEnd> {
    // Split the tcp stream into a command stream and an event writer with better ergonomics
    let (mut commands, mut event_writer) = transport::server::split_tcp_stream(stream);

    loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // The user closed the tcp stream or asked to quit
                None | Some(Ok(UserCommand::Quit(_))) => return Ok(SessionEnd::Closed),
                Some(Ok(cmd)) => coordinator.command(socket_id, cmd).await?,
                // A line we could not understand, the connection is still usable
                Some(Err(err)) => warn!(socket_id, "skipping unreadable command: {:#}", err),
            },
            // Events addressed to this connection by the coordinator
            event = mailbox_rx.recv() => match event {
                Some(event) => event_writer.write(&event).await?,
                // The coordinator dropped this connection, everything queued has been written
                None => {
                    debug!(socket_id, "mailbox closed by coordinator");
                    return Ok(SessionEnd::Closed);
                }
            },
            // If the server is shutting down, we can just close the tcp streams
            // and exit the session handler without notifying the other members
            Ok(_) = quit_rx.recv() => {
                debug!(socket_id, "shutting down user tcp stream");
                return Ok(SessionEnd::Shutdown);
            }
        }
    }
}
