//! # Chronicle Game Server
//!
//! Room-lifecycle and round-consensus engine for Chronicle, a multiplayer
//! story-voting game: players join a themed room, vote each round between
//! two narrative branches, and earn token rewards for siding with the
//! majority.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CHRONICLE SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/              - Shared primitives                     │
//! │  ├── id.rs          - Player identities                     │
//! │  └── ledger.rs      - Token balance store                   │
//! │                                                             │
//! │  game/              - Game logic (pure state machine)       │
//! │  ├── config.rs      - Game configuration and reward policy  │
//! │  ├── error.rs       - Recoverable error kinds               │
//! │  ├── room.rs        - Room membership and lifecycle         │
//! │  ├── round.rs       - Vote collection, tally, progression   │
//! │  ├── rewards.rs     - End-of-game payout strategies         │
//! │  ├── leaderboard.rs - Bounded score-ordered history         │
//! │  └── player.rs      - Player directory and statistics       │
//! │                                                             │
//! │  service/           - Concurrent request surface            │
//! │  ├── mod.rs         - GameService (room registry + stores)  │
//! │  ├── protocol.rs    - Request/response message types        │
//! │  ├── archive.rs     - Terminal-game summary recording       │
//! │  └── snapshot.rs    - Full-state serialization              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Each room is an independently locked unit of state: operations against
//! one room serialize behind its own `RwLock`, while operations against
//! different rooms proceed concurrently. Shared stores (ledger, player
//! directory, leaderboard) carry their own locks and are never held across
//! a room-lock acquisition. Every operation completes or fails atomically;
//! a failed precondition check leaves no partial mutation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod service;

// Re-export commonly used types
pub use crate::core::id::PlayerId;
pub use crate::core::ledger::TokenLedger;
pub use game::config::{GameConfig, RewardPolicy};
pub use game::error::GameError;
pub use game::room::{Choice, Room, RoomId, RoomStatus};
pub use service::GameService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of voting rounds in a complete game.
pub const ROUND_COUNT: u8 = 5;

/// Maximum members per room.
pub const ROOM_CAPACITY: usize = 8;

/// Minimum members required to start a game.
pub const MIN_PLAYERS: usize = 2;

/// Bound on retained leaderboard entries.
pub const LEADERBOARD_CAPACITY: usize = 100;
