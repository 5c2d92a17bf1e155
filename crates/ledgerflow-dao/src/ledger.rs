//! Fund accounting.
//!
//! `available = contributions - disbursed - withdrawn` holds after every
//! method returns. Debits check the balance first, so `available` can
//! never go negative.

use crate::error::DaoError;
use ledgerflow_types::Amount;
use serde::Serialize;

/// Running totals of every value movement through the DAO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    total_contributions: Amount,
    total_disbursed: Amount,
    total_withdrawn: Amount,
    available: Amount,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available(&self) -> Amount {
        self.available
    }

    pub fn total_contributions(&self) -> Amount {
        self.total_contributions
    }

    pub fn total_disbursed(&self) -> Amount {
        self.total_disbursed
    }

    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    /// Fail unless `amount` can be debited.
    pub fn ensure_available(&self, amount: Amount) -> Result<(), DaoError> {
        if amount > self.available {
            return Err(DaoError::InsufficientFunds {
                requested: amount,
                available: self.available,
            });
        }
        Ok(())
    }

    /// Fail unless `amount` can be credited without overflow.
    pub fn ensure_creditable(&self, amount: Amount) -> Result<(), DaoError> {
        self.total_contributions
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;
        Ok(())
    }

    pub fn record_contribution(&mut self, amount: Amount) -> Result<(), DaoError> {
        let total = self
            .total_contributions
            .checked_add(amount)
            .ok_or(DaoError::Overflow)?;
        // available <= total, so this cannot overflow once the line above succeeded
        let available = self.available.checked_add(amount).ok_or(DaoError::Overflow)?;
        self.total_contributions = total;
        self.available = available;
        Ok(())
    }

    pub fn disburse(&mut self, amount: Amount) -> Result<(), DaoError> {
        self.ensure_available(amount)?;
        self.available = self.available.saturating_sub(amount);
        self.total_disbursed = self.total_disbursed.saturating_add(amount);
        Ok(())
    }

    /// Undo a [`Ledger::disburse`] whose transfer failed.
    pub fn revert_disbursement(&mut self, amount: Amount) {
        self.total_disbursed = self.total_disbursed.saturating_sub(amount);
        self.available = self.available.saturating_add(amount);
    }

    pub fn withdraw(&mut self, amount: Amount) -> Result<(), DaoError> {
        self.ensure_available(amount)?;
        self.available = self.available.saturating_sub(amount);
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
        Ok(())
    }

    /// Undo a [`Ledger::withdraw`] whose transfer failed.
    pub fn revert_withdrawal(&mut self, amount: Amount) {
        self.total_withdrawn = self.total_withdrawn.saturating_sub(amount);
        self.available = self.available.saturating_add(amount);
    }

    /// Check the accounting identity.
    pub fn is_balanced(&self) -> bool {
        self.total_contributions
            .checked_sub(self.total_disbursed)
            .and_then(|rest| rest.checked_sub(self.total_withdrawn))
            == Some(self.available)
    }
}
