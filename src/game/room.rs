//! Room State
//!
//! Membership and lifecycle for a single game room. A room is the unit of
//! mutable state: the service serializes all operations against one room
//! behind a single lock, so the methods here assume exclusive access and
//! uphold the lifecycle invariants themselves.
//!
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;
use crate::game::error::GameError;
use crate::{MIN_PLAYERS, ROOM_CAPACITY, ROUND_COUNT};

/// Unique room identifier, strictly increasing, never reused.
pub type RoomId = u64;

// =============================================================================
// CHOICE
// =============================================================================

/// One of the two narrative branches offered each round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// Branch A. Wins tied tallies.
    A,
    /// Branch B.
    B,
}

impl Choice {
    /// Parse wire text into a branch.
    ///
    /// The engine API is typed; this is the single place raw caller input
    /// becomes a [`Choice`], and the only source of
    /// [`GameError::InvalidChoice`].
    pub fn parse(s: &str) -> Result<Self, GameError> {
        match s {
            "A" => Ok(Choice::A),
            "B" => Ok(Choice::B),
            _ => Err(GameError::InvalidChoice),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a decision path as a compact string, e.g. `"AABAB"`.
pub fn path_string(path: &[Choice]) -> String {
    path.iter().map(Choice::as_str).collect()
}

// =============================================================================
// ROOM STATUS
// =============================================================================

/// Room lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Accepting members; game not started.
    Waiting,
    /// Rounds in progress.
    Playing,
    /// Round 5 finalized, rewards distributed. Terminal.
    Finished,
    /// Last member left before start. Terminal, non-reusable.
    Closed,
}

// =============================================================================
// ROOM
// =============================================================================

/// State of one game room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Story theme chosen at creation.
    pub theme: String,
    /// Current host. Always a member unless the room is closed.
    pub host: PlayerId,
    /// Members in join order.
    members: Vec<PlayerId>,
    /// Display-name cache, filled at join time.
    names: BTreeMap<PlayerId, String>,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Current round: 0 before start, 1..=5 while playing.
    pub round: u8,
    /// One vote bucket per round, indexed by `round - 1`.
    votes: [BTreeMap<PlayerId, Choice>; ROUND_COUNT as usize],
    /// Winning branch of each completed round.
    pub path: Vec<Choice>,
    /// Per-member cumulative score.
    scores: BTreeMap<PlayerId, u64>,
    /// Entry fee recorded at creation; joins charge and leaves refund
    /// exactly this amount.
    pub entry_fee: u64,
    /// Entry fees accumulated, the pool for the pooled-split strategy.
    pub pot: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Create a room in `Waiting` with the creator as sole member and host.
    ///
    /// The creator's entry fee must already have been debited.
    pub fn new(
        id: RoomId,
        theme: impl Into<String>,
        host: PlayerId,
        host_name: impl Into<String>,
        entry_fee: u64,
    ) -> Self {
        let mut names = BTreeMap::new();
        names.insert(host, host_name.into());
        let mut scores = BTreeMap::new();
        scores.insert(host, 0);

        Self {
            id,
            theme: theme.into(),
            host,
            members: vec![host],
            names,
            status: RoomStatus::Waiting,
            round: 0,
            votes: Default::default(),
            path: Vec::new(),
            scores,
            entry_fee,
            pot: entry_fee,
            created_at: Utc::now(),
        }
    }

    /// Members in join order.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the identity is a current member.
    pub fn is_member(&self, id: &PlayerId) -> bool {
        self.members.contains(id)
    }

    /// Cached display name, `"Unknown"` if absent.
    pub fn display_name(&self, id: &PlayerId) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or("Unknown")
    }

    /// Cumulative score for a member.
    pub fn score(&self, id: &PlayerId) -> u64 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Per-member cumulative scores.
    pub fn scores(&self) -> &BTreeMap<PlayerId, u64> {
        &self.scores
    }

    /// Add `amount` to a member's cumulative score.
    pub(crate) fn add_score(&mut self, id: &PlayerId, amount: u64) {
        if let Some(score) = self.scores.get_mut(id) {
            *score += amount;
        }
    }

    /// Vote bucket for the current round.
    ///
    /// Empty before the game starts; after the final round it still holds
    /// that round's votes.
    pub fn current_votes(&self) -> &BTreeMap<PlayerId, Choice> {
        match self.round {
            0 => &self.votes[0],
            r => &self.votes[(r - 1) as usize],
        }
    }

    pub(crate) fn current_votes_mut(&mut self) -> &mut BTreeMap<PlayerId, Choice> {
        debug_assert!(self.round >= 1 && self.round <= ROUND_COUNT);
        &mut self.votes[(self.round - 1) as usize]
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Check every join precondition without mutating.
    ///
    /// The service calls this, then debits the entry fee, then
    /// [`Room::add_member`], all under the same room lock, so a failed
    /// debit leaves the room untouched.
    pub fn ensure_can_join(&self, joiner: &PlayerId) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.members.len() >= ROOM_CAPACITY {
            return Err(GameError::RoomFull);
        }
        if self.is_member(joiner) {
            return Err(GameError::AlreadyMember);
        }
        Ok(())
    }

    /// Append a member whose entry fee has been debited.
    ///
    /// Call only after [`Room::ensure_can_join`] under the same lock.
    pub fn add_member(&mut self, joiner: PlayerId, name: impl Into<String>) {
        debug_assert!(self.ensure_can_join(&joiner).is_ok());
        self.members.push(joiner);
        self.names.insert(joiner, name.into());
        self.scores.insert(joiner, 0);
        self.pot += self.entry_fee;
    }

    /// Remove a member while the room is still waiting.
    ///
    /// Returns the entry fee to refund. The departing host hands off to the
    /// earliest-joined remaining member; an emptied room closes.
    pub fn remove_member(&mut self, member: &PlayerId) -> Result<u64, GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameInProgress);
        }
        let idx = self
            .members
            .iter()
            .position(|m| m == member)
            .ok_or(GameError::NotMember)?;

        self.members.remove(idx);
        self.names.remove(member);
        self.scores.remove(member);
        self.pot -= self.entry_fee;

        if *member == self.host {
            match self.members.first() {
                Some(next) => self.host = *next,
                None => self.status = RoomStatus::Closed,
            }
        }

        Ok(self.entry_fee)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Transition `Waiting` → `Playing` at the host's request.
    pub fn start(&mut self, requester: &PlayerId) -> Result<(), GameError> {
        if *requester != self.host {
            return Err(GameError::NotHost);
        }
        if self.members.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        self.status = RoomStatus::Playing;
        self.round = 1;
        debug_assert!(self.votes.iter().all(BTreeMap::is_empty));
        Ok(())
    }

    /// Summary line for the waiting-room listing.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            theme: self.theme.clone(),
            host: self.display_name(&self.host).to_string(),
            member_count: self.members.len(),
            created_at: self.created_at,
        }
    }

    /// Full caller-facing view of the room.
    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.id,
            theme: self.theme.clone(),
            host: self.host,
            members: self.members.clone(),
            names: self.names.clone(),
            status: self.status,
            round: self.round,
            current_votes: self.current_votes().clone(),
            path: self.path.clone(),
            scores: self.scores.clone(),
            entry_fee: self.entry_fee,
            pot: self.pot,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// One line of the waiting-room listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room identifier.
    pub id: RoomId,
    /// Story theme.
    pub theme: String,
    /// Host display name.
    pub host: String,
    /// Current member count.
    pub member_count: usize,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Full room state as returned to callers (for frontend sync).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    /// Room identifier.
    pub id: RoomId,
    /// Story theme.
    pub theme: String,
    /// Current host.
    pub host: PlayerId,
    /// Members in join order.
    pub members: Vec<PlayerId>,
    /// Display-name cache.
    pub names: BTreeMap<PlayerId, String>,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Current round number.
    pub round: u8,
    /// Votes submitted for the current round.
    pub current_votes: BTreeMap<PlayerId, Choice>,
    /// Winning branch per completed round.
    pub path: Vec<Choice>,
    /// Per-member cumulative scores.
    pub scores: BTreeMap<PlayerId, u64>,
    /// Entry fee recorded at creation.
    pub entry_fee: u64,
    /// Accumulated entry fees.
    pub pot: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
