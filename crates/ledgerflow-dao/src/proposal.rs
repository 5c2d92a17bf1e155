//! Proposal lifecycle management.
//!
//! A proposal is open for votes until `ends_at`, can be executed once its
//! votes reach quorum, and is frozen after execution.

use crate::error::DaoError;
use ledgerflow_types::{Address, Amount, Timestamp};
use serde::Serialize;
use std::collections::BTreeSet;

/// Request to pay `amount` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    /// Sequential id, starting at 0
    pub id: u64,
    /// Free-form name
    pub name: String,
    /// Investor who created it
    pub proposer: Address,
    /// Requested disbursement
    pub amount: Amount,
    /// Who gets paid on execution
    pub recipient: Address,
    /// Sum of the contributions of everyone who voted
    pub votes: Amount,
    /// Investors who voted
    pub voters: BTreeSet<Address>,
    /// Executed flag
    pub executed: bool,
    pub created_at: Timestamp,
    /// Votes are accepted while `now < ends_at`
    pub ends_at: Timestamp,
    pub executed_at: Option<Timestamp>,
}

impl Proposal {
    /// Create a new proposal.
    pub fn new(
        id: u64,
        name: String,
        proposer: Address,
        amount: Amount,
        recipient: Address,
        created_at: Timestamp,
        voting_period: u64,
    ) -> Self {
        Self {
            id,
            name,
            proposer,
            amount,
            recipient,
            votes: Amount::ZERO,
            voters: BTreeSet::new(),
            executed: false,
            created_at,
            ends_at: created_at.saturating_add(voting_period),
            executed_at: None,
        }
    }

    /// Check if votes are still accepted.
    pub fn is_open(&self, now: Timestamp) -> bool {
        now < self.ends_at
    }

    /// Check if voter has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    /// Fail unless `voter` could cast a vote of `weight` right now. An
    /// executed proposal takes no more votes even while its window is open.
    pub fn check_vote(
        &self,
        voter: &Address,
        weight: Amount,
        now: Timestamp,
    ) -> Result<Amount, DaoError> {
        if !self.is_open(now) {
            return Err(DaoError::WindowClosed {
                closed_at: self.ends_at,
                now,
            });
        }

        if self.executed {
            return Err(DaoError::AlreadyExecuted(self.id));
        }

        if self.has_voted(voter) {
            return Err(DaoError::DuplicateVote {
                proposal_id: self.id,
                voter: *voter,
            });
        }

        self.votes.checked_add(weight).ok_or(DaoError::Overflow)
    }

    /// Cast a vote. Returns the new vote total.
    pub fn cast_vote(
        &mut self,
        voter: Address,
        weight: Amount,
        now: Timestamp,
    ) -> Result<Amount, DaoError> {
        let total = self.check_vote(&voter, weight, now)?;
        self.votes = total;
        self.voters.insert(voter);
        Ok(total)
    }

    pub fn mark_executed(&mut self, now: Timestamp) -> Result<(), DaoError> {
        if self.executed {
            return Err(DaoError::AlreadyExecuted(self.id));
        }
        self.executed = true;
        self.executed_at = Some(now);
        Ok(())
    }

    /// Undo [`Proposal::mark_executed`] after a failed transfer.
    pub fn revert_execution(&mut self) {
        self.executed = false;
        self.executed_at = None;
    }
}

/// Proposal registry managing all proposals.
#[derive(Debug, Default)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
}

impl ProposalRegistry {
    /// Create a new registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next proposal will get.
    pub fn next_id(&self) -> u64 {
        self.proposals.len() as u64
    }

    /// Create a new proposal.
    pub fn create_proposal(
        &mut self,
        name: String,
        proposer: Address,
        amount: Amount,
        recipient: Address,
        now: Timestamp,
        voting_period: u64,
    ) -> &Proposal {
        let id = self.next_id();
        self.proposals.push(Proposal::new(
            id,
            name,
            proposer,
            amount,
            recipient,
            now,
            voting_period,
        ));
        &self.proposals[self.proposals.len() - 1]
    }

    /// Get a proposal.
    pub fn get(&self, id: u64) -> Option<&Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get(i))
    }

    /// Get a proposal mutably.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get_mut(i))
    }

    /// All proposals in id order.
    pub fn all(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
