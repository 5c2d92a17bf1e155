use ledgerflow_core::TransferError;
use ledgerflow_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur in DAO operations.
///
/// None of these are retryable as-is: the caller has to change the input or
/// wait for the state to change first.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DaoError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Window closed at {closed_at}, now {now}")]
    WindowClosed { closed_at: Timestamp, now: Timestamp },

    #[error("Proposal not found: {0}")]
    NotFound(u64),

    #[error("{voter:?} already voted on proposal {proposal_id}")]
    DuplicateVote { proposal_id: u64, voter: Address },

    #[error("Amount {requested} exceeds limit {limit}")]
    AmountExceedsLimit { requested: Amount, limit: Amount },

    #[error("Quorum not met: {actual} < {required}")]
    QuorumNotMet { actual: Amount, required: Amount },

    #[error("Proposal {0} already executed")]
    AlreadyExecuted(u64),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Payload-free discriminant of [`DaoError`], used to match expected
/// failures in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaoErrorKind {
    Unauthorized,
    WindowClosed,
    NotFound,
    DuplicateVote,
    AmountExceedsLimit,
    QuorumNotMet,
    AlreadyExecuted,
    InsufficientFunds,
    InvalidAmount,
    TransferFailed,
    Overflow,
    InvalidConfig,
}

impl DaoError {
    pub fn kind(&self) -> DaoErrorKind {
        match self {
            DaoError::Unauthorized(_) => DaoErrorKind::Unauthorized,
            DaoError::WindowClosed { .. } => DaoErrorKind::WindowClosed,
            DaoError::NotFound(_) => DaoErrorKind::NotFound,
            DaoError::DuplicateVote { .. } => DaoErrorKind::DuplicateVote,
            DaoError::AmountExceedsLimit { .. } => DaoErrorKind::AmountExceedsLimit,
            DaoError::QuorumNotMet { .. } => DaoErrorKind::QuorumNotMet,
            DaoError::AlreadyExecuted(_) => DaoErrorKind::AlreadyExecuted,
            DaoError::InsufficientFunds { .. } => DaoErrorKind::InsufficientFunds,
            DaoError::InvalidAmount(_) => DaoErrorKind::InvalidAmount,
            DaoError::TransferFailed(_) => DaoErrorKind::TransferFailed,
            DaoError::Overflow => DaoErrorKind::Overflow,
            DaoError::InvalidConfig(_) => DaoErrorKind::InvalidConfig,
        }
    }
}

impl DaoErrorKind {
    pub const ALL: [DaoErrorKind; 12] = [
        DaoErrorKind::Unauthorized,
        DaoErrorKind::WindowClosed,
        DaoErrorKind::NotFound,
        DaoErrorKind::DuplicateVote,
        DaoErrorKind::AmountExceedsLimit,
        DaoErrorKind::QuorumNotMet,
        DaoErrorKind::AlreadyExecuted,
        DaoErrorKind::InsufficientFunds,
        DaoErrorKind::InvalidAmount,
        DaoErrorKind::TransferFailed,
        DaoErrorKind::Overflow,
        DaoErrorKind::InvalidConfig,
    ];
}

impl fmt::Display for DaoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for DaoErrorKind {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.to_string() == s)
            .ok_or_else(|| DaoError::InvalidConfig(format!("Unknown error kind: {}", s)))
    }
}
