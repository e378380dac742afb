//! Token Ledger
//!
//! Per-identity token balances. The engine consumes this as a plain balance
//! store: `credit` always succeeds, `debit` signals insufficient funds and
//! leaves the balance untouched.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::core::id::PlayerId;
use crate::game::error::GameError;

/// In-memory token balance store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: BTreeMap<PlayerId, u64>,
}

impl TokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance for an identity; unknown identities hold zero.
    pub fn balance(&self, id: &PlayerId) -> u64 {
        self.balances.get(id).copied().unwrap_or(0)
    }

    /// Whether the identity has ever held a balance entry.
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.balances.contains_key(id)
    }

    /// Seed an identity with a starting grant unless it already has an entry.
    ///
    /// Re-registration must never reset an existing balance.
    pub fn seed(&mut self, id: PlayerId, grant: u64) {
        self.balances.entry(id).or_insert(grant);
    }

    /// Add tokens to an identity. Always succeeds.
    pub fn credit(&mut self, id: PlayerId, amount: u64) {
        *self.balances.entry(id).or_insert(0) += amount;
    }

    /// Remove tokens from an identity.
    ///
    /// Fails with [`GameError::InsufficientBalance`] if the balance is below
    /// `amount`; the ledger is untouched on failure, so a never-seen
    /// identity stays absent and still qualifies for a later seed.
    pub fn debit(&mut self, id: &PlayerId, amount: u64) -> Result<u64, GameError> {
        if self.balance(id) < amount {
            return Err(GameError::InsufficientBalance);
        }
        let balance = self.balances.entry(*id).or_insert(0);
        *balance -= amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_identity_is_zero() {
        let ledger = TokenLedger::new();
        assert_eq!(ledger.balance(&PlayerId::new([7; 16])), 0);
    }

    #[test]
    fn test_credit_then_debit() {
        let mut ledger = TokenLedger::new();
        let id = PlayerId::new([1; 16]);

        ledger.credit(id, 100);
        assert_eq!(ledger.balance(&id), 100);

        let remaining = ledger.debit(&id, 30).unwrap();
        assert_eq!(remaining, 70);
        assert_eq!(ledger.balance(&id), 70);
    }

    #[test]
    fn test_debit_insufficient_leaves_balance() {
        let mut ledger = TokenLedger::new();
        let id = PlayerId::new([1; 16]);
        ledger.credit(id, 5);

        let result = ledger.debit(&id, 10);
        assert!(matches!(result, Err(GameError::InsufficientBalance)));
        assert_eq!(ledger.balance(&id), 5);
    }

    #[test]
    fn test_seed_does_not_reset() {
        let mut ledger = TokenLedger::new();
        let id = PlayerId::new([1; 16]);

        ledger.seed(id, 100);
        assert_eq!(ledger.balance(&id), 100);

        ledger.debit(&id, 40).unwrap();
        ledger.seed(id, 100);
        assert_eq!(ledger.balance(&id), 60);
    }

    #[test]
    fn test_seed_ignores_spent_entry() {
        // A zeroed entry still counts as present.
        let mut ledger = TokenLedger::new();
        let id = PlayerId::new([1; 16]);

        ledger.seed(id, 10);
        ledger.debit(&id, 10).unwrap();
        ledger.seed(id, 100);
        assert_eq!(ledger.balance(&id), 0);
    }

    #[test]
    fn test_failed_debit_leaves_unknown_identity_absent() {
        let mut ledger = TokenLedger::new();
        let id = PlayerId::new([1; 16]);

        assert!(ledger.debit(&id, 10).is_err());
        assert!(!ledger.contains(&id));

        // The identity still qualifies for its starting grant.
        ledger.seed(id, 100);
        assert_eq!(ledger.balance(&id), 100);
    }
}
