//! Service Layer
//!
//! [`GameService`] owns every store and exposes the request/response API a
//! thin transport drives. One `RwLock` per room serializes operations
//! against that room while different rooms proceed concurrently; the
//! shared stores (ledger, directory, leaderboard) carry their own locks.
//!
//! Lock order is room first, then at most one store lock at a time; a
//! store lock is never held across a room-lock acquisition. Precondition
//! checks run before any mutation, so a failed call leaves no partial
//! state behind.

pub mod archive;
pub mod protocol;
pub mod snapshot;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::id::PlayerId;
use crate::core::ledger::TokenLedger;
use crate::game::config::{GameConfig, RewardPolicy};
use crate::game::error::GameError;
use crate::game::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::game::player::{PlayerDirectory, PlayerProfile};
use crate::game::rewards::{accrual_payouts, pooled_payouts, Payout};
use crate::game::room::{path_string, Choice, Room, RoomId, RoomStatus, RoomSummary, RoomView};
use crate::game::round::{self, RoundOutcome, VoteAck};

pub use archive::{ChronicleSink, GameSummary, MemorySink};
pub use protocol::{dispatch, Request, Response};
pub use snapshot::Snapshot;

// =============================================================================
// REPLY TYPES
// =============================================================================

/// Result of finalizing a non-terminal round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Winning branch. Ties favor A.
    pub winner: Choice,
    /// Votes for branch A.
    pub count_a: u32,
    /// Votes for branch B.
    pub count_b: u32,
    /// The new current round.
    pub next_round: u8,
    /// Path so far.
    pub path: Vec<Choice>,
}

/// One member's share of a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// Member identity.
    pub player: PlayerId,
    /// Display name at game end.
    pub name: String,
    /// Final room score.
    pub score: u64,
    /// Tokens credited.
    pub reward: u64,
    /// Ledger balance after the credit.
    pub balance: u64,
}

/// End-of-game breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Room identifier.
    pub room_id: RoomId,
    /// Story theme.
    pub theme: String,
    /// Winning branch of the final round.
    pub winner: Choice,
    /// Complete decision path.
    pub path: Vec<Choice>,
    /// Per-member breakdown in join order.
    pub results: Vec<PlayerResult>,
}

/// What a finalize call produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinalizeReply {
    /// The game advanced to the next round.
    Round(RoundReport),
    /// The final round completed and rewards were distributed.
    GameOver(GameResult),
}

// =============================================================================
// GAME SERVICE
// =============================================================================

/// The engine's request surface: room registry, round driver, and shared
/// stores, constructed once per process.
pub struct GameService {
    config: GameConfig,
    rooms: RwLock<BTreeMap<RoomId, Arc<RwLock<Room>>>>,
    next_room_id: AtomicU64,
    games_finished: AtomicU64,
    ledger: RwLock<TokenLedger>,
    players: RwLock<PlayerDirectory>,
    leaderboard: RwLock<Leaderboard>,
    sink: Option<Arc<dyn ChronicleSink>>,
}

impl GameService {
    /// Create a service with no external recorder.
    pub fn new(config: GameConfig) -> Self {
        Self::with_sink_opt(config, None)
    }

    /// Create a service that offers finished-game summaries to `sink`.
    pub fn with_sink(config: GameConfig, sink: Arc<dyn ChronicleSink>) -> Self {
        Self::with_sink_opt(config, Some(sink))
    }

    fn with_sink_opt(config: GameConfig, sink: Option<Arc<dyn ChronicleSink>>) -> Self {
        Self {
            config,
            rooms: RwLock::new(BTreeMap::new()),
            next_room_id: AtomicU64::new(1),
            games_finished: AtomicU64::new(0),
            ledger: RwLock::new(TokenLedger::new()),
            players: RwLock::new(PlayerDirectory::new()),
            leaderboard: RwLock::new(Leaderboard::new()),
            sink,
        }
    }

    /// The configuration this service runs with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    async fn room(&self, id: RoomId) -> Result<Arc<RwLock<Room>>, GameError> {
        let rooms = self.rooms.read().await;
        rooms.get(&id).cloned().ok_or(GameError::RoomNotFound)
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Register or re-register a player.
    ///
    /// First registration seeds the ledger with the starting grant;
    /// re-registration overwrites display metadata only. Returns the
    /// profile and current balance.
    pub async fn register(
        &self,
        caller: PlayerId,
        name: &str,
        avatar: &str,
    ) -> (PlayerProfile, u64) {
        let (profile, first) = {
            let mut players = self.players.write().await;
            let first = players.register(caller, name, avatar);
            let profile = players
                .profile(&caller)
                .cloned()
                .expect("profile present after register");
            (profile, first)
        };
        let balance = {
            let mut ledger = self.ledger.write().await;
            ledger.seed(caller, self.config.starting_grant);
            ledger.balance(&caller)
        };
        if first {
            info!(player = %caller.short(), name, balance, "player registered");
        }
        (profile, balance)
    }

    /// Token balance; zero for unknown identities.
    pub async fn balance(&self, id: &PlayerId) -> u64 {
        self.ledger.read().await.balance(id)
    }

    /// Lifetime `(games, wins, total_rewards)`; zeros for unknown
    /// identities.
    pub async fn stats(&self, id: &PlayerId) -> (u64, u64, u64) {
        self.players.read().await.stats(id)
    }

    /// Profile for an identity, if registered.
    pub async fn profile(&self, id: &PlayerId) -> Option<PlayerProfile> {
        self.players.read().await.profile(id).cloned()
    }

    // =========================================================================
    // Room registry
    // =========================================================================

    /// Create a room, charging the creator's entry fee.
    pub async fn create_room(
        &self,
        caller: PlayerId,
        theme: &str,
        entry_fee: Option<u64>,
    ) -> Result<RoomView, GameError> {
        let fee = entry_fee.unwrap_or(self.config.entry_fee);
        let host_name = self.players.read().await.display_name(&caller);

        // Debit first: on failure nothing else has happened, and once the
        // fee is taken the insert below cannot fail.
        self.ledger.write().await.debit(&caller, fee)?;

        let id = self.next_room_id.fetch_add(1, Ordering::SeqCst);
        let room = Room::new(id, theme, caller, host_name, fee);
        let view = room.view();
        self.rooms
            .write()
            .await
            .insert(id, Arc::new(RwLock::new(room)));

        info!(room = id, theme, host = %caller.short(), fee, "room created");
        Ok(view)
    }

    /// Join a waiting room, charging the room's recorded entry fee.
    pub async fn join_room(
        &self,
        room_id: RoomId,
        caller: PlayerId,
    ) -> Result<RoomView, GameError> {
        let room_arc = self.room(room_id).await?;
        let mut room = room_arc.write().await;

        room.ensure_can_join(&caller)?;
        self.ledger.write().await.debit(&caller, room.entry_fee)?;
        let name = self.players.read().await.display_name(&caller);
        room.add_member(caller, name);

        debug!(room = room_id, player = %caller.short(), members = room.member_count(), "joined room");
        Ok(room.view())
    }

    /// Leave a waiting room with a full refund. Returns the new balance.
    pub async fn leave_room(
        &self,
        room_id: RoomId,
        caller: PlayerId,
    ) -> Result<u64, GameError> {
        let room_arc = self.room(room_id).await?;
        let mut room = room_arc.write().await;

        let refund = room.remove_member(&caller)?;
        if room.status == RoomStatus::Closed {
            debug!(room = room_id, "room closed, last member left");
        }

        let mut ledger = self.ledger.write().await;
        ledger.credit(caller, refund);
        Ok(ledger.balance(&caller))
    }

    /// Summaries of all waiting rooms, ascending by id.
    ///
    /// Finite and restartable: every call re-reads current state.
    pub async fn list_waiting_rooms(&self) -> Vec<RoomSummary> {
        let arcs: Vec<Arc<RwLock<Room>>> =
            self.rooms.read().await.values().cloned().collect();

        let mut summaries = Vec::new();
        for arc in arcs {
            let room = arc.read().await;
            if room.status == RoomStatus::Waiting {
                summaries.push(room.summary());
            }
        }
        summaries
    }

    /// Full view of a room.
    pub async fn get_room(&self, room_id: RoomId) -> Result<RoomView, GameError> {
        let room_arc = self.room(room_id).await?;
        let view = room_arc.read().await.view();
        Ok(view)
    }

    /// Drop closed rooms from the registry. Their ids are never reused.
    pub async fn cleanup(&self) {
        let mut rooms = self.rooms.write().await;
        let mut closed = Vec::new();
        for (id, arc) in rooms.iter() {
            if arc.read().await.status == RoomStatus::Closed {
                closed.push(*id);
            }
        }
        for id in closed {
            rooms.remove(&id);
        }
    }

    // =========================================================================
    // Round engine
    // =========================================================================

    /// Start the game at the host's request.
    pub async fn start_game(
        &self,
        room_id: RoomId,
        caller: PlayerId,
    ) -> Result<RoomView, GameError> {
        let room_arc = self.room(room_id).await?;
        let mut room = room_arc.write().await;

        room.start(&caller)?;
        info!(room = room_id, members = room.member_count(), "game started");
        Ok(room.view())
    }

    /// Record a member's vote for the current round.
    pub async fn submit_vote(
        &self,
        room_id: RoomId,
        caller: PlayerId,
        round_num: u8,
        choice: Choice,
    ) -> Result<VoteAck, GameError> {
        let room_arc = self.room(room_id).await?;
        let mut room = room_arc.write().await;

        let ack = round::submit_vote(&mut room, &caller, round_num, choice)?;
        debug!(
            room = room_id,
            round = round_num,
            player = %caller.short(),
            votes = ack.vote_count,
            members = ack.member_count,
            "vote recorded"
        );
        Ok(ack)
    }

    /// Finalize the current round; distributes rewards on the final one.
    ///
    /// May be driven by any caller, e.g. an external scheduler after a
    /// deadline; participation is never required.
    pub async fn finalize_round(&self, room_id: RoomId) -> Result<FinalizeReply, GameError> {
        let room_arc = self.room(room_id).await?;
        let mut room = room_arc.write().await;

        match round::finalize_round(&mut room, &self.config)? {
            RoundOutcome::Advanced {
                tally,
                next_round,
                path,
            } => {
                info!(
                    room = room_id,
                    winner = %tally.winner,
                    count_a = tally.count_a,
                    count_b = tally.count_b,
                    next_round,
                    "round finalized"
                );
                Ok(FinalizeReply::Round(RoundReport {
                    winner: tally.winner,
                    count_a: tally.count_a,
                    count_b: tally.count_b,
                    next_round,
                    path,
                }))
            }
            RoundOutcome::Finished { tally, path } => {
                let result = self.distribute(&room, tally.winner, path).await?;
                Ok(FinalizeReply::GameOver(result))
            }
        }
    }

    /// Apply end-of-game payouts to the ledger, directory, and leaderboard,
    /// then offer the summary to the sink. Called with the room lock held.
    async fn distribute(
        &self,
        room: &Room,
        winner: Choice,
        path: Vec<Choice>,
    ) -> Result<GameResult, GameError> {
        let payouts: Vec<Payout> = match self.config.reward_policy {
            RewardPolicy::ScoreAccrual => accrual_payouts(room, self.config.base_reward),
            RewardPolicy::PooledSplit => pooled_payouts(room)?,
        };

        let mut results = Vec::with_capacity(payouts.len());
        {
            let mut ledger = self.ledger.write().await;
            for payout in &payouts {
                ledger.credit(payout.player, payout.reward);
                results.push(PlayerResult {
                    player: payout.player,
                    name: payout.name.clone(),
                    score: payout.score,
                    reward: payout.reward,
                    balance: ledger.balance(&payout.player),
                });
            }
        }
        {
            let mut players = self.players.write().await;
            for payout in &payouts {
                players.record_completion(&payout.player, payout.reward, payout.is_win);
            }
        }
        let finished_at = Utc::now();
        {
            let mut leaderboard = self.leaderboard.write().await;
            for payout in &payouts {
                leaderboard.record(LeaderboardEntry {
                    player: payout.player,
                    name: payout.name.clone(),
                    score: payout.score,
                    theme: room.theme.clone(),
                    timestamp: finished_at,
                });
            }
        }
        self.games_finished.fetch_add(1, Ordering::SeqCst);

        info!(
            room = room.id,
            path = %path_string(&path),
            players = payouts.len(),
            "game finished, rewards distributed"
        );

        if let Some(sink) = &self.sink {
            let summary = GameSummary {
                room_id: room.id,
                theme: room.theme.clone(),
                path: path.clone(),
                player_count: room.member_count(),
                top_score: payouts.iter().map(|p| p.score).max().unwrap_or(0),
                finished_at,
            };
            if !sink.record(&summary) {
                warn!(room = room.id, "chronicle sink declined game summary");
            }
        }

        Ok(GameResult {
            room_id: room.id,
            theme: room.theme.clone(),
            winner,
            path,
            results,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Top `limit` leaderboard entries.
    pub async fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.leaderboard.read().await.top(limit).to_vec()
    }

    /// Lifetime totals: `(rooms created, games finished)`.
    pub fn totals(&self) -> (u64, u64) {
        (
            self.next_room_id.load(Ordering::SeqCst) - 1,
            self.games_finished.load(Ordering::SeqCst),
        )
    }
}
