//! Player Directory
//!
//! Display metadata and lifetime statistics per identity. Profiles are
//! created on registration, mutated only by game completion, and never
//! deleted.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;

/// Display metadata and lifetime statistics for one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name.
    pub name: String,
    /// Avatar reference (opaque to the engine).
    pub avatar: String,
    /// Lifetime games completed.
    pub games: u64,
    /// Lifetime wins (pooled-split winner slots).
    pub wins: u64,
    /// Lifetime tokens rewarded.
    pub rewards: u64,
    /// First registration time.
    pub registered_at: DateTime<Utc>,
}

/// Registry of player profiles.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerDirectory {
    players: BTreeMap<PlayerId, PlayerProfile>,
}

impl PlayerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a profile.
    ///
    /// Re-registration overwrites display metadata only; statistics and the
    /// original registration time survive. Returns whether this was a first
    /// registration (the caller seeds the ledger grant on `true`).
    pub fn register(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> bool {
        match self.players.get_mut(&id) {
            Some(profile) => {
                profile.name = name.into();
                profile.avatar = avatar.into();
                false
            }
            None => {
                self.players.insert(
                    id,
                    PlayerProfile {
                        name: name.into(),
                        avatar: avatar.into(),
                        games: 0,
                        wins: 0,
                        rewards: 0,
                        registered_at: Utc::now(),
                    },
                );
                true
            }
        }
    }

    /// Profile for an identity, if registered.
    pub fn profile(&self, id: &PlayerId) -> Option<&PlayerProfile> {
        self.players.get(id)
    }

    /// Display name, `"Unknown"` for unregistered identities.
    pub fn display_name(&self, id: &PlayerId) -> String {
        self.players
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Lifetime `(games, wins, total_rewards)`; zeros for unknown
    /// identities, never an error.
    pub fn stats(&self, id: &PlayerId) -> (u64, u64, u64) {
        self.players
            .get(id)
            .map(|p| (p.games, p.wins, p.rewards))
            .unwrap_or((0, 0, 0))
    }

    /// Record a completed game: bump games played and accumulated rewards,
    /// and the win counter when the payout carried a win.
    pub fn record_completion(&mut self, id: &PlayerId, reward: u64, is_win: bool) {
        if let Some(profile) = self.players.get_mut(id) {
            profile.games += 1;
            profile.rewards += reward;
            if is_win {
                profile.wins += 1;
            }
        }
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_stats() {
        let mut directory = PlayerDirectory::new();
        let id = PlayerId::new([1; 16]);

        assert!(directory.register(id, "alice", "cat.png"));
        assert_eq!(directory.display_name(&id), "alice");
        assert_eq!(directory.stats(&id), (0, 0, 0));
    }

    #[test]
    fn test_reregister_keeps_stats() {
        let mut directory = PlayerDirectory::new();
        let id = PlayerId::new([1; 16]);

        directory.register(id, "alice", "cat.png");
        directory.record_completion(&id, 70, true);

        assert!(!directory.register(id, "alicia", "dog.png"));
        let profile = directory.profile(&id).unwrap();
        assert_eq!(profile.name, "alicia");
        assert_eq!(profile.avatar, "dog.png");
        assert_eq!(directory.stats(&id), (1, 1, 70));
    }

    #[test]
    fn test_unknown_identity_stats_are_zero() {
        let directory = PlayerDirectory::new();
        let id = PlayerId::new([9; 16]);
        assert_eq!(directory.stats(&id), (0, 0, 0));
        assert_eq!(directory.display_name(&id), "Unknown");
    }

    #[test]
    fn test_record_completion_accumulates() {
        let mut directory = PlayerDirectory::new();
        let id = PlayerId::new([1; 16]);
        directory.register(id, "alice", "");

        directory.record_completion(&id, 100, false);
        directory.record_completion(&id, 50, true);
        assert_eq!(directory.stats(&id), (2, 1, 150));
    }

    #[test]
    fn test_record_completion_for_unregistered_is_noop() {
        let mut directory = PlayerDirectory::new();
        let id = PlayerId::new([1; 16]);
        directory.record_completion(&id, 100, true);
        assert_eq!(directory.stats(&id), (0, 0, 0));
    }
}
