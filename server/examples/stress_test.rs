use std::time::Duration;

use comms::{event::Event, replica::EditorReplica, transport};
use nanoid::nanoid;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpStream, sync::mpsc, task::JoinSet};
use tokio_stream::StreamExt;

/// Stress Test for the Room Sync Server
///
/// Generates synthetic load with typists who join random rooms and keep sending full document changes.
/// The number of typists, number of rooms and typing speed can be configured.
///
/// !IMPORTANT! Be sure to check and configure your socket limits, before you run the tests

const SERVER_ADDR: &str = "localhost:8080";

/// Stress Test Configuration
// The number of typists to spawn, distributed across the load increments
const LOAD_INCREMENTS: &str = r#"[
    { "user_count": 600, "after": { "secs": 60, "nanos": 0 }, "steps": 60 },
    { "user_count": 1200, "after": { "secs": 120, "nanos": 0 }, "steps": 60 }
]"#;
// How many distinct rooms the typists are spread over
const NUMBER_OF_ROOMS: usize = 50;
// How many milliseconds to wait between each keystroke of a typist
const KEYSTROKE_DELAY_MILLIS: u64 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoadIncrements {
    user_count: usize,
    after: Duration,
    steps: usize,
}

async fn spawn_single_typist(room_id: String) -> anyhow::Result<()> {
    let result = spawn_single_typist_raw(room_id).await;

    if let Err(err) = result.as_ref() {
        println!("some error occurred = {}", err);
    }

    result
}

async fn spawn_single_typist_raw(room_id: String) -> anyhow::Result<()> {
    let tcp_stream = TcpStream::connect(SERVER_ADDR).await?;
    let (mut event_stream, mut command_writer) = transport::client::split_tcp_stream(tcp_stream);
    let mut replica = EditorReplica::new(room_id, String::from(&nanoid!()[0..5]));

    match event_stream.next().await {
        Some(Ok(event @ Event::Welcome(_))) => {
            replica.apply(&event);
        }
        _ => return Err(anyhow::anyhow!("server did not send welcome")),
    }

    command_writer.write(&replica.join_command()).await?;

    // keystrokes and sync answers are written by a single task
    let (outbound_tx, mut outbound_rx) = mpsc::channel(16);
    let writer = tokio::spawn(async move {
        while let Some(command) = outbound_rx.recv().await {
            if command_writer.write(&command).await.is_err() {
                break;
            }
        }
    });

    let typist = tokio::spawn({
        let mut rng = StdRng::from_entropy();
        let mut replica = replica.clone();
        let outbound_tx = outbound_tx.clone();
        let to_sleep = Duration::from_millis(KEYSTROKE_DELAY_MILLIS);

        async move {
            // sleep initially for a time to distribute the typing times
            tokio::time::sleep(Duration::from_millis(
                rng.gen_range(1..KEYSTROKE_DELAY_MILLIS),
            ))
            .await;

            loop {
                let mut code = replica.code.clone();
                code.push(rng.gen_range('a'..='z'));
                if outbound_tx.send(replica.edit(code)).await.is_err() {
                    break;
                }

                tokio::time::sleep(to_sleep).await;
            }
        }
    });

    while let Some(Ok(event)) = event_stream.next().await {
        for response in replica.apply(&event) {
            let _ = outbound_tx.send(response).await;
        }
    }

    typist.abort();
    writer.abort();
    Ok(())
}

#[tokio::main]
async fn main() {
    let load_increments: Vec<LoadIncrements> =
        serde_json::from_str(LOAD_INCREMENTS).expect("could not parse the load increments");
    let room_ids: Vec<String> = (0..NUMBER_OF_ROOMS).map(|_| nanoid!()).collect();

    let mut rng = StdRng::from_entropy();
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let mut current: usize = 0;
    for li in load_increments {
        let diff = li.user_count - current;
        let sleep_duration =
            Duration::from_millis((li.after.as_millis() / li.steps as u128) as u64);
        let to_increment = diff / li.steps;

        for _ in 0..li.steps {
            for _ in 0..to_increment {
                let room_id = room_ids[rng.gen_range(0..room_ids.len())].clone();

                join_set.spawn(spawn_single_typist(room_id));
            }

            current += to_increment;
            println!("total typists: {}", current);
            tokio::time::sleep(sleep_duration).await;
        }
    }

    while join_set.join_next().await.is_some() {}
}
