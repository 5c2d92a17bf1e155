//! Value movement.
//!
//! A contract decides *whether* value moves; a [`FundsTransfer`] performs
//! the move and may refuse. [`Bank`] keeps per-address balances in memory
//! and can be told to fail, which is how rollback paths are exercised.

use crate::error::TransferError;
use ledgerflow_types::{Address, Amount};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Pays `amount` to `to`.
pub trait FundsTransfer {
    /// Move value to a recipient. An `Err` means nothing moved.
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferError>;
}

impl<T: FundsTransfer + ?Sized> FundsTransfer for &mut T {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferError> {
        (**self).transfer(to, amount)
    }
}

impl<T: FundsTransfer + ?Sized> FundsTransfer for Box<T> {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferError> {
        (**self).transfer(to, amount)
    }
}

/// Bank handle that can be held by an engine and inspected from outside.
pub type SharedBank = Arc<Mutex<Bank>>;

impl<T: FundsTransfer> FundsTransfer for Arc<Mutex<T>> {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferError> {
        self.lock().transfer(to, amount)
    }
}

/// A settled transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub to: Address,
    pub amount: Amount,
}

/// In-memory balances of every address that ever received value.
#[derive(Debug, Default)]
pub struct Bank {
    balances: HashMap<Address, Amount>,
    history: Vec<TransferRecord>,
    blocked: HashSet<Address>,
    fail_next: usize,
}

impl Bank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a bank for sharing with an engine.
    pub fn shared() -> SharedBank {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Get account balance
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(Amount::ZERO)
    }

    /// Seed a balance outside of any transfer.
    pub fn credit(&mut self, address: Address, amount: Amount) -> Result<(), TransferError> {
        let entry = self.balances.entry(address).or_insert(Amount::ZERO);
        *entry = entry.checked_add(amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    /// Settled transfers, oldest first.
    pub fn history(&self) -> &[TransferRecord] {
        &self.history
    }

    /// Sum of every settled transfer.
    pub fn total_transferred(&self) -> Amount {
        self.history
            .iter()
            .fold(Amount::ZERO, |acc, r| acc.saturating_add(r.amount))
    }

    /// Refuse every future transfer to `address`.
    pub fn block(&mut self, address: Address) {
        self.blocked.insert(address);
    }

    /// Accept transfers to `address` again.
    pub fn unblock(&mut self, address: &Address) {
        self.blocked.remove(address);
    }

    /// Fail the next `count` transfers regardless of recipient.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }
}

impl FundsTransfer for Bank {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), TransferError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            tracing::debug!("Injected transfer failure to {}", to.short());
            return Err(TransferError::Failed {
                to,
                amount,
                reason: "injected failure".to_string(),
            });
        }

        if self.blocked.contains(&to) {
            tracing::debug!("Transfer to blocked address {}", to.short());
            return Err(TransferError::Rejected(to));
        }

        self.credit(to, amount)?;
        self.history.push(TransferRecord { to, amount });
        tracing::trace!("Transferred {} to {}", amount, to.short());
        Ok(())
    }
}
