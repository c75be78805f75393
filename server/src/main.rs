use anyhow::Context;
use clap::Parser;
use server::ServerConfig;
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("could not bind to {}", config.listen_addr()))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    tokio::spawn(async move {
        interrupt.recv().await;
        let _ = quit_tx.send(());
    });

    server::serve(listener, config, quit_rx).await
}
