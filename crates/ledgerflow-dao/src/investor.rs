//! Investor records.

use ledgerflow_types::{Address, Amount, Timestamp};
use serde::Serialize;

/// A participant who has contributed at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Investor {
    /// Identity key
    pub address: Address,
    /// Total contributed; this is also the investor's vote weight
    pub contribution: Amount,
    /// Membership flag, set on first contribution
    pub member: bool,
    /// When the first contribution landed
    pub joined_at: Timestamp,
}

impl Investor {
    pub fn new(address: Address, joined_at: Timestamp) -> Self {
        Self {
            address,
            contribution: Amount::ZERO,
            member: true,
            joined_at,
        }
    }

    /// Contribution after adding `amount`, without applying it.
    pub fn contribution_after(&self, amount: Amount) -> Option<Amount> {
        self.contribution.checked_add(amount)
    }

    pub fn vote_weight(&self) -> Amount {
        self.contribution
    }
}
