//! Reward Strategies
//!
//! Pure payout computation for finished games. Two deliberately separate
//! policies: per-member score accrual, and a pooled split that pays a
//! single winner index. The service applies the computed payouts to the
//! ledger, directory, and leaderboard.

use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;
use crate::game::error::GameError;
use crate::game::room::Room;

/// One member's computed payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Member identity.
    pub player: PlayerId,
    /// Display name at game end.
    pub name: String,
    /// Final cumulative room score.
    pub score: u64,
    /// Tokens to credit.
    pub reward: u64,
    /// Whether this payout counts as a lifetime win.
    pub is_win: bool,
}

/// Score-accrual payouts: `base_reward + score / 2` per member, join order.
///
/// Integer division floors, matching the documented reward table.
pub fn accrual_payouts(room: &Room, base_reward: u64) -> Vec<Payout> {
    room.members()
        .iter()
        .map(|id| {
            let score = room.score(id);
            Payout {
                player: *id,
                name: room.display_name(id).to_string(),
                score,
                reward: base_reward + score / 2,
                is_win: false,
            }
        })
        .collect()
}

/// Pooled-split payouts over a room: the pool is the room's pot and the
/// winner is the top cumulative score, earliest joiner on ties.
pub fn pooled_payouts(room: &Room) -> Result<Vec<Payout>, GameError> {
    let winner_index = pooled_winner_index(room)?;
    let shares = split_pool(room.members(), winner_index, room.pot)?;

    Ok(shares
        .into_iter()
        .map(|(id, reward, is_win)| Payout {
            player: id,
            name: room.display_name(&id).to_string(),
            score: room.score(&id),
            reward,
            is_win,
        })
        .collect())
}

/// Split a pool: 60% shared evenly across all players, 40% to the winner.
///
/// Fails on an empty player list; no shares are produced. Integer division
/// truncates both components, so remainder tokens stay unminted.
pub fn split_pool(
    players: &[PlayerId],
    winner_index: usize,
    pool: u64,
) -> Result<Vec<(PlayerId, u64, bool)>, GameError> {
    if players.is_empty() {
        return Err(GameError::NotEnoughPlayers);
    }

    let winner_bonus = pool * 40 / 100;
    let base_share = pool * 60 / 100 / players.len() as u64;

    Ok(players
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let is_win = i == winner_index;
            let reward = if is_win { base_share + winner_bonus } else { base_share };
            (*id, reward, is_win)
        })
        .collect())
}

/// Index of the pooled-split winner: highest cumulative score, with the
/// earliest-joined member winning ties.
fn pooled_winner_index(room: &Room) -> Result<usize, GameError> {
    room.members()
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            room.score(a)
                .cmp(&room.score(b))
                // max_by keeps the later of equals; prefer the earlier index.
                .then(ib.cmp(ia))
        })
        .map(|(i, _)| i)
        .ok_or(GameError::NotEnoughPlayers)
}
