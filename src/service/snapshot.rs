//! State Snapshots
//!
//! Full-state capture and restore: the room dictionary, player directory,
//! balances, leaderboard, and counters round-trip losslessly through JSON
//! (debugging ease) or bincode (compact), with a sha2 digest over the
//! binary form for integrity logging.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::core::ledger::TokenLedger;
use crate::game::config::GameConfig;
use crate::game::leaderboard::Leaderboard;
use crate::game::player::PlayerDirectory;
use crate::game::room::{Room, RoomId};
use crate::service::{ChronicleSink, GameService};

/// Complete persisted state of a service instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// All rooms by id, terminal ones included.
    pub rooms: BTreeMap<RoomId, Room>,
    /// Player directory.
    pub players: PlayerDirectory,
    /// Token balances.
    pub ledger: TokenLedger,
    /// Leaderboard.
    pub leaderboard: Leaderboard,
    /// Next room id to allocate.
    pub next_room_id: u64,
    /// Games finished so far.
    pub games_finished: u64,
}

impl Snapshot {
    /// Encode as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encode as bincode bytes.
    pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Decode from bincode bytes.
    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }

    /// Sha-256 digest of the binary encoding, for integrity logging.
    pub fn digest(&self) -> bincode::Result<[u8; 32]> {
        let bytes = self.to_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().into())
    }
}

impl GameService {
    /// Capture the full current state.
    pub async fn snapshot(&self) -> Snapshot {
        let arcs: Vec<(RoomId, Arc<RwLock<Room>>)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, arc)| (*id, arc.clone()))
            .collect();

        let mut rooms = BTreeMap::new();
        for (id, arc) in arcs {
            rooms.insert(id, arc.read().await.clone());
        }

        Snapshot {
            rooms,
            players: self.players.read().await.clone(),
            ledger: self.ledger.read().await.clone(),
            leaderboard: self.leaderboard.read().await.clone(),
            next_room_id: self.next_room_id.load(Ordering::SeqCst),
            games_finished: self.games_finished.load(Ordering::SeqCst),
        }
    }

    /// Rebuild a service from a snapshot.
    pub fn restore(
        snapshot: Snapshot,
        config: GameConfig,
        sink: Option<Arc<dyn ChronicleSink>>,
    ) -> Self {
        let rooms = snapshot
            .rooms
            .into_iter()
            .map(|(id, room)| (id, Arc::new(RwLock::new(room))))
            .collect();

        Self {
            config,
            rooms: RwLock::new(rooms),
            next_room_id: AtomicU64::new(snapshot.next_room_id),
            games_finished: AtomicU64::new(snapshot.games_finished),
            ledger: RwLock::new(snapshot.ledger),
            players: RwLock::new(snapshot.players),
            leaderboard: RwLock::new(snapshot.leaderboard),
            sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::PlayerId;
    use crate::game::room::{Choice, RoomStatus};

    async fn populated_service() -> (GameService, PlayerId, PlayerId, RoomId) {
        let service = GameService::new(GameConfig::default());
        let p1 = PlayerId::new([1; 16]);
        let p2 = PlayerId::new([2; 16]);
        service.register(p1, "p1", "a.png").await;
        service.register(p2, "p2", "b.png").await;

        let room = service.create_room(p1, "theme", None).await.unwrap();
        service.join_room(room.id, p2).await.unwrap();
        service.start_game(room.id, p1).await.unwrap();
        service.submit_vote(room.id, p1, 1, Choice::A).await.unwrap();
        service.finalize_round(room.id).await.unwrap();

        (service, p1, p2, room.id)
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let (service, _, _, _) = populated_service().await;
        let snapshot = service.snapshot().await;

        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored.rooms, snapshot.rooms);
        assert_eq!(restored.leaderboard, snapshot.leaderboard);
        assert_eq!(restored.next_room_id, snapshot.next_room_id);
    }

    #[tokio::test]
    async fn test_bincode_round_trip_and_digest() {
        let (service, _, _, _) = populated_service().await;
        let snapshot = service.snapshot().await;

        let bytes = snapshot.to_bytes().unwrap();
        let restored = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(restored.rooms, snapshot.rooms);
        assert_eq!(restored.digest().unwrap(), snapshot.digest().unwrap());
    }

    #[tokio::test]
    async fn test_restored_service_continues_game() {
        let (service, p1, p2, room_id) = populated_service().await;
        let snapshot = service.snapshot().await;
        drop(service);

        let service = GameService::restore(snapshot, GameConfig::default(), None);

        // The restored room is mid-game at round 2.
        let view = service.get_room(room_id).await.unwrap();
        assert_eq!(view.status, RoomStatus::Playing);
        assert_eq!(view.round, 2);
        assert_eq!(view.path, vec![Choice::A]);

        // Balances and scores carried over; play continues to completion.
        assert_eq!(service.balance(&p1).await, 90);
        for round in 2..=crate::ROUND_COUNT {
            service.submit_vote(room_id, p1, round, Choice::A).await.unwrap();
            service.submit_vote(room_id, p2, round, Choice::B).await.unwrap();
            service.finalize_round(room_id).await.unwrap();
        }
        let view = service.get_room(room_id).await.unwrap();
        assert_eq!(view.status, RoomStatus::Finished);
        assert_eq!(view.scores[&p1], 100);
    }

    #[tokio::test]
    async fn test_restored_ids_stay_unique() {
        let (service, p1, _, first_id) = populated_service().await;
        let snapshot = service.snapshot().await;

        let service = GameService::restore(snapshot, GameConfig::default(), None);
        let room = service.create_room(p1, "second", None).await.unwrap();
        assert!(room.id > first_id);
    }
}
