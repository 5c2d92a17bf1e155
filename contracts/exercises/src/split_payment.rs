//! Pay several recipients out of one attached value.

use ledgerflow_core::{FundsTransfer, TransferError};
use ledgerflow_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitPaymentError {
    #[error("only owner can send transfer")]
    NotOwner,

    #[error("to must be same length as amount ({recipients} != {amounts})")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("Attached value {value} does not cover payouts of {required}")]
    InsufficientValue { value: Amount, required: Amount },

    #[error("Payout stopped after {settled} transfers: {source}")]
    PartialPayout {
        settled: usize,
        #[source]
        source: TransferError,
    },

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Splitter contract state. Leftover value accumulates in `balance`.
#[derive(Debug, Clone)]
pub struct SplitPayment {
    owner: Address,
    balance: Amount,
}

impl SplitPayment {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balance: Amount::ZERO,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Pay `amounts[i]` to `recipients[i]` out of `value`.
    pub fn send(
        &mut self,
        caller: Address,
        recipients: &[Address],
        amounts: &[Amount],
        value: Amount,
        transfer: &mut impl FundsTransfer,
    ) -> Result<Amount, SplitPaymentError> {
        if recipients.len() != amounts.len() {
            return Err(SplitPaymentError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }

        if caller != self.owner {
            return Err(SplitPaymentError::NotOwner);
        }

        let required = amounts
            .iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(*a))
            .ok_or(SplitPaymentError::Overflow)?;
        let leftover = value
            .checked_sub(required)
            .ok_or(SplitPaymentError::InsufficientValue { value, required })?;
        let new_balance = self
            .balance
            .checked_add(value)
            .ok_or(SplitPaymentError::Overflow)?;

        let mut sent = Amount::ZERO;
        for (settled, (to, amount)) in recipients.iter().zip(amounts).enumerate() {
            if let Err(source) = transfer.transfer(*to, *amount) {
                tracing::warn!("Split payout stopped at recipient {}: {}", settled, source);
                // value that never left stays with the contract
                self.balance = new_balance.saturating_sub(sent);
                return Err(SplitPaymentError::PartialPayout { settled, source });
            }
            sent = sent.saturating_add(*amount);
        }

        self.balance = self.balance.saturating_add(leftover);
        Ok(leftover)
    }
}
