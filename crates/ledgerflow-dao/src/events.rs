//! Events emitted by successful DAO operations.

use ledgerflow_types::{Address, Amount, Timestamp};
use serde::Serialize;

/// Record of a committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum DaoEvent {
    Contributed {
        investor: Address,
        amount: Amount,
        total_contribution: Amount,
        at: Timestamp,
    },
    ProposalCreated {
        proposal_id: u64,
        proposer: Address,
        name: String,
        amount: Amount,
        recipient: Address,
        ends_at: Timestamp,
    },
    VoteCast {
        proposal_id: u64,
        voter: Address,
        weight: Amount,
        total_votes: Amount,
    },
    ProposalExecuted {
        proposal_id: u64,
        executor: Address,
        recipient: Address,
        amount: Amount,
        at: Timestamp,
    },
    Withdrawn {
        admin: Address,
        recipient: Address,
        amount: Amount,
        at: Timestamp,
    },
}

impl DaoEvent {
    /// Proposal the event refers to, if any.
    pub fn proposal_id(&self) -> Option<u64> {
        match self {
            DaoEvent::ProposalCreated { proposal_id, .. }
            | DaoEvent::VoteCast { proposal_id, .. }
            | DaoEvent::ProposalExecuted { proposal_id, .. } => Some(*proposal_id),
            DaoEvent::Contributed { .. } | DaoEvent::Withdrawn { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DaoEvent::Contributed { .. } => "Contributed",
            DaoEvent::ProposalCreated { .. } => "ProposalCreated",
            DaoEvent::VoteCast { .. } => "VoteCast",
            DaoEvent::ProposalExecuted { .. } => "ProposalExecuted",
            DaoEvent::Withdrawn { .. } => "Withdrawn",
        }
    }
}
