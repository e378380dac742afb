//! Chronicle Game Server
//!
//! Runs a complete scripted game against the engine: registration, room
//! setup, five voting rounds with partial participation, reward
//! distribution, and a snapshot digest at the end.

use std::sync::Arc;
use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chronicle::{
    game::room::path_string,
    service::{protocol, FinalizeReply, MemorySink, Request, Response},
    Choice, GameConfig, GameService, PlayerId, ROUND_COUNT, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Chronicle Server v{}", VERSION);

    demo_game().await
}

/// Demo function to run one full game through the service.
async fn demo_game() -> Result<()> {
    info!("=== Starting Demo Game ===");

    let sink = Arc::new(MemorySink::new());
    let service = GameService::with_sink(GameConfig::default(), sink.clone());

    // Register four players
    let players: Vec<PlayerId> = (1u8..=4).map(|i| PlayerId::new([i; 16])).collect();
    let names = ["mira", "oren", "suki", "tavo"];
    for (id, name) in players.iter().zip(names) {
        let (profile, balance) = service.register(*id, name, "default.png").await;
        info!("Registered {} with balance {}", profile.name, balance);
    }

    // Host creates a room, everyone else joins through the protocol layer
    let host = players[0];
    let room = service
        .create_room(host, "the drowned archive", None)
        .await?;
    info!("Room {} created: \"{}\"", room.id, room.theme);

    for id in &players[1..] {
        let response = protocol::dispatch(
            &service,
            *id,
            Request::JoinRoom { room_id: room.id },
        )
        .await;
        if let Response::Room(view) = response {
            info!("{} joined ({} members)", service.profile(id).await.map(|p| p.name).unwrap_or_default(), view.members.len());
        }
    }

    let waiting = service.list_waiting_rooms().await;
    info!("Waiting rooms: {}", waiting.len());

    service.start_game(room.id, host).await?;
    info!("Game started");

    // Five rounds; round 3 has a non-voter to show partial participation
    for round in 1..=ROUND_COUNT {
        for (i, id) in players.iter().enumerate() {
            if round == 3 && i == 3 {
                continue; // tavo sits this one out
            }
            let choice = if i % 2 == 0 { Choice::A } else { Choice::B };
            let ack = service.submit_vote(room.id, *id, round, choice).await?;
            if ack.all_voted {
                info!("Round {}: all {} votes in", round, ack.vote_count);
            }
        }

        match service.finalize_round(room.id).await? {
            FinalizeReply::Round(report) => {
                info!(
                    "Round {} finalized: {} wins {}-{}, path {}",
                    round,
                    report.winner,
                    report.count_a,
                    report.count_b,
                    path_string(&report.path)
                );
            }
            FinalizeReply::GameOver(result) => {
                info!("=== Game Over ===");
                info!("Path: {}", path_string(&result.path));
                for r in &result.results {
                    info!(
                        "{}: score {} -> reward {} (balance {})",
                        r.name, r.score, r.reward, r.balance
                    );
                }
            }
        }
    }

    // Leaderboard and totals
    let board = service.leaderboard(10).await;
    info!("=== Leaderboard ===");
    for (i, entry) in board.iter().enumerate() {
        info!("#{}: {} - {} ({})", i + 1, entry.name, entry.score, entry.theme);
    }

    let (rooms_created, games_finished) = service.totals();
    info!("Totals: {} rooms, {} games", rooms_created, games_finished);
    info!("Summaries recorded externally: {}", sink.recorded().len());

    // Snapshot digest for integrity logging
    let snapshot = service.snapshot().await;
    let digest = snapshot.digest()?;
    info!("Snapshot digest: {}", hex::encode(digest));

    Ok(())
}
