//! Game Errors
//!
//! Every failure the engine can report to a caller. All variants are
//! expected, recoverable conditions returned as tagged results; the service
//! stays available for other rooms and callers after any of them.

use serde::{Deserialize, Serialize};

/// Recoverable failure returned by engine operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameError {
    /// No room with the given id.
    #[error("Room not found")]
    RoomNotFound,

    /// Only the host may start the game.
    #[error("Only host can start")]
    NotHost,

    /// Fewer than the minimum members to start.
    #[error("Need at least 2 players")]
    NotEnoughPlayers,

    /// Room is no longer accepting members or a second start.
    #[error("Game already started")]
    GameAlreadyStarted,

    /// Vote or finalize against a room that is not playing.
    #[error("Game not in progress")]
    GameNotInProgress,

    /// Caller is not a member of the room.
    #[error("Not in this room")]
    NotMember,

    /// Caller is already a member of the room.
    #[error("Already in room")]
    AlreadyMember,

    /// Room is at capacity.
    #[error("Room is full")]
    RoomFull,

    /// Vote carried a round number other than the current round.
    #[error("Wrong round")]
    WrongRound,

    /// Choice was not one of the two branches.
    #[error("Invalid choice")]
    InvalidChoice,

    /// Ledger balance below the required amount.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Leave attempted after the game started.
    #[error("Cannot leave during game")]
    GameInProgress,
}
