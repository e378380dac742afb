//! Terminal-Game Recording
//!
//! Optional collaborator that accepts a summary of every finished game for
//! append-only external record keeping. The engine calls it once per
//! finished game and only logs the acknowledgment; game results never
//! depend on it.

use std::sync::Mutex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::room::{Choice, RoomId};

/// Summary of one finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Room identifier.
    pub room_id: RoomId,
    /// Story theme.
    pub theme: String,
    /// Complete decision path.
    pub path: Vec<Choice>,
    /// Number of participating members.
    pub player_count: usize,
    /// Highest final room score.
    pub top_score: u64,
    /// When the game finished.
    pub finished_at: DateTime<Utc>,
}

/// Sink for terminal-game summaries.
///
/// Implementations must not block: recording happens inline on the
/// finalize path.
pub trait ChronicleSink: Send + Sync {
    /// Accept a summary; returns whether it was recorded.
    fn record(&self, summary: &GameSummary) -> bool;
}

/// In-memory sink for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<GameSummary>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Summaries recorded so far.
    pub fn recorded(&self) -> Vec<GameSummary> {
        self.entries.lock().expect("sink poisoned").clone()
    }
}

impl ChronicleSink for MemorySink {
    fn record(&self, summary: &GameSummary) -> bool {
        self.entries
            .lock()
            .expect("sink poisoned")
            .push(summary.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        let summary = GameSummary {
            room_id: 1,
            theme: "theme".to_string(),
            path: vec![Choice::A, Choice::B],
            player_count: 3,
            top_score: 60,
            finished_at: Utc::now(),
        };

        assert!(sink.record(&summary));
        assert_eq!(sink.recorded(), vec![summary]);
    }
}
