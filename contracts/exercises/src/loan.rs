//! Borrower/lender loan as a three-state machine.
//!
//! Pending --fund--> Active --reimburse (after maturity)--> Closed

use ledgerflow_core::{Clock, FundsTransfer, TransferError};
use ledgerflow_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoanState {
    Pending,
    Active,
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoanError {
    #[error("only lender can lend")]
    NotLender,

    #[error("only borrower can reimburse")]
    NotBorrower,

    #[error("can only lend the exact amount")]
    WrongFundingAmount { expected: Amount, got: Amount },

    #[error("borrower need to reimburse exactly amount + interest")]
    WrongReimbursement { expected: Amount, got: Amount },

    #[error("Loan is {0:?}, which does not allow this")]
    InvalidState(LoanState),

    #[error("loan hasnt matured yet")]
    NotMatured { matures_at: Timestamp },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// Fixed terms agreed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub amount: Amount,
    pub interest: Amount,
    /// Seconds from funding to maturity
    pub duration: u64,
    pub borrower: Address,
    pub lender: Address,
}

/// Loan contract state.
#[derive(Debug, Clone)]
pub struct LoanStateMachine {
    terms: LoanTerms,
    state: LoanState,
    matures_at: Option<Timestamp>,
}

impl LoanStateMachine {
    pub fn new(terms: LoanTerms) -> Result<Self, LoanError> {
        terms.amount.checked_add(terms.interest).ok_or(LoanError::Overflow)?;
        Ok(Self {
            terms,
            state: LoanState::Pending,
            matures_at: None,
        })
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn state(&self) -> LoanState {
        self.state
    }

    /// Set once the loan is funded.
    pub fn matures_at(&self) -> Option<Timestamp> {
        self.matures_at
    }

    fn repayment(&self) -> Amount {
        self.terms.amount.saturating_add(self.terms.interest)
    }

    /// Lender sends the principal, which goes straight to the borrower.
    pub fn fund(
        &mut self,
        caller: Address,
        value: Amount,
        clock: &impl Clock,
        transfer: &mut impl FundsTransfer,
    ) -> Result<Timestamp, LoanError> {
        if caller != self.terms.lender {
            return Err(LoanError::NotLender);
        }
        if value != self.terms.amount {
            return Err(LoanError::WrongFundingAmount {
                expected: self.terms.amount,
                got: value,
            });
        }
        if self.state != LoanState::Pending {
            return Err(LoanError::InvalidState(self.state));
        }

        transfer.transfer(self.terms.borrower, value)?;

        let matures_at = clock.now().saturating_add(self.terms.duration);
        self.state = LoanState::Active;
        self.matures_at = Some(matures_at);
        tracing::info!("Loan funded, matures at {}", matures_at);
        Ok(matures_at)
    }

    /// Borrower repays principal plus interest, which goes to the lender.
    pub fn reimburse(
        &mut self,
        caller: Address,
        value: Amount,
        clock: &impl Clock,
        transfer: &mut impl FundsTransfer,
    ) -> Result<(), LoanError> {
        if caller != self.terms.borrower {
            return Err(LoanError::NotBorrower);
        }
        let expected = self.repayment();
        if value != expected {
            return Err(LoanError::WrongReimbursement { expected, got: value });
        }
        let matures_at = match (self.state, self.matures_at) {
            (LoanState::Active, Some(at)) => at,
            _ => return Err(LoanError::InvalidState(self.state)),
        };
        if clock.now() < matures_at {
            return Err(LoanError::NotMatured { matures_at });
        }

        transfer.transfer(self.terms.lender, value)?;

        self.state = LoanState::Closed;
        tracing::info!("Loan closed");
        Ok(())
    }
}
