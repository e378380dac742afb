//! Leaderboard
//!
//! Bounded, score-ordered log of completed participations. Entries are
//! appended at game end, re-sorted descending, and truncated to the bound;
//! no entry is ever individually deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;
use crate::LEADERBOARD_CAPACITY;

/// One completed participation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player identity.
    pub player: PlayerId,
    /// Display name at game end.
    pub name: String,
    /// Final room score.
    pub score: u64,
    /// Theme of the finished game.
    pub theme: String,
    /// When the game finished.
    pub timestamp: DateTime<Utc>,
}

/// Bounded history, kept sorted by score descending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create an empty leaderboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, re-sort, and truncate to the bound.
    ///
    /// The sort is stable, so earlier finishes stay ahead among equal
    /// scores.
    pub fn record(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }

    /// Top `limit` entries, highest score first.
    pub fn top(&self, limit: usize) -> &[LeaderboardEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// All retained entries, highest score first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the board holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
