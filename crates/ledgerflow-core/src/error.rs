use ledgerflow_types::{Address, Amount};
use thiserror::Error;

/// Failure reported by a [`crate::FundsTransfer`] collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("Recipient {0:?} rejected the transfer")]
    Rejected(Address),

    #[error("Transfer of {amount} to {to:?} failed: {reason}")]
    Failed {
        to: Address,
        amount: Amount,
        reason: String,
    },

    #[error("Recipient balance overflow")]
    Overflow,
}
