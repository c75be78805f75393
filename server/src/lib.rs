//! Room synchronization server for a collaborative code editor.
//!
//! Clients connect over TCP and exchange newline delimited JSON. Every connection
//! runs its own session task, all room state lives in a single coordinator task:
//!
//! ```text
//! client ── session task ──┐                        ┌── mailbox ── session task ── client
//! client ── session task ──┼── coordinator queue ───┼── mailbox ── session task ── client
//! client ── session task ──┘   (RoomRegistry)       └── mailbox ── session task ── client
//! ```
//!
//! Code is shared as whole documents, the last change a client applies wins.

use anyhow::Context;
use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};
use tracing::{info, warn};

pub mod config;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod session;

pub use self::config::ServerConfig;

/// Accept connections on `listener` until a quit signal arrives, then wait for
/// every session to wind down.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    mut quit_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let (coordinator_handle, coordinator_task) = coordinator::spawn(
        coordinator::SessionCoordinator::new(config.default_language.clone()),
        config.inbox_capacity,
    );
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let addr = listener
        .local_addr()
        .context("listener has no local address")?;
    info!(%addr, "listening");

    loop {
        tokio::select! {
            _ = quit_rx.recv() => {
                info!("server interrupted, gracefully shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    info!(%peer, "accepted connection");
                    join_set.spawn(session::handle_user_session(
                        coordinator_handle.clone(),
                        config.mailbox_capacity,
                        quit_rx.resubscribe(),
                        socket,
                    ));
                }
                Err(err) => warn!("failed to accept connection: {}", err),
            },
            // Reap finished sessions so the set does not grow with every connection
            Some(finished) = join_set.join_next() => match finished {
                Ok(Err(err)) => warn!("session ended with an error: {:#}", err),
                Err(err) => warn!("session task failed: {}", err),
                Ok(Ok(())) => {}
            },
        }
    }

    while join_set.join_next().await.is_some() {}

    drop(coordinator_handle);
    coordinator_task
        .await
        .context("coordinator task failed")?;

    info!("server shut down");

    Ok(())
}
