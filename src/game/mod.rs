//! Game Logic Module
//!
//! The pure room/round state machine and its satellite stores. Everything
//! here is synchronous and lock-free; the service layer owns concurrency.
//!
//! ## Module Structure
//!
//! - `config`: Game configuration and reward-policy selection
//! - `error`: Recoverable error kinds
//! - `room`: Room membership, host transfer, lifecycle status
//! - `round`: Vote collection, tally, round progression
//! - `rewards`: End-of-game payout strategies
//! - `leaderboard`: Bounded score-ordered history
//! - `player`: Player directory and lifetime statistics

pub mod config;
pub mod error;
pub mod room;
pub mod round;
pub mod rewards;
pub mod leaderboard;
pub mod player;

// Re-export key types
pub use config::{GameConfig, RewardPolicy};
pub use error::GameError;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use player::{PlayerDirectory, PlayerProfile};
pub use room::{Choice, Room, RoomId, RoomStatus, RoomSummary, RoomView};
pub use round::{RoundOutcome, Tally, VoteAck};
