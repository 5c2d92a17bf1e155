//! Owner-controlled wallet.
//!
//! Anyone may deposit; only the owner may send funds out.

use ledgerflow_core::{FundsTransfer, TransferError};
use ledgerflow_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WalletError {
    #[error("sender is not allowed")]
    NotOwner,

    #[error("Insufficient balance: requested {requested}, have {balance}")]
    InsufficientBalance { requested: Amount, balance: Amount },

    #[error("Balance overflow")]
    Overflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// Wallet contract state.
#[derive(Debug, Clone)]
pub struct EtherWallet {
    owner: Address,
    balance: Amount,
}

impl EtherWallet {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balance: Amount::ZERO,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Balance held by the contract.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Accept attached value from anyone.
    pub fn deposit(&mut self, value: Amount) -> Result<Amount, WalletError> {
        self.balance = self.balance.checked_add(value).ok_or(WalletError::Overflow)?;
        Ok(self.balance)
    }

    /// Pay `amount` to `to`. Owner only.
    pub fn send(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        transfer: &mut impl FundsTransfer,
    ) -> Result<Amount, WalletError> {
        if caller != self.owner {
            return Err(WalletError::NotOwner);
        }

        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(WalletError::InsufficientBalance {
                requested: amount,
                balance: self.balance,
            })?;

        transfer.transfer(to, amount)?;
        self.balance = remaining;
        tracing::debug!("Wallet sent {} to {}", amount, to.short());
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerflow_core::Bank;

    #[test]
    fn test_wallet_owner() {
        let owner = Address::from_label("owner");
        assert_eq!(EtherWallet::new(owner).owner(), owner);
    }

    #[test]
    fn test_wallet_deposit_and_send() {
        let owner = Address::from_label("owner");
        let bob = Address::from_label("bob");
        let mut bank = Bank::new();
        let mut wallet = EtherWallet::new(owner);

        wallet.deposit(Amount::new(100)).unwrap();
        assert_eq!(wallet.balance(), Amount::new(100));

        wallet.send(owner, bob, Amount::new(50), &mut bank).unwrap();
        assert_eq!(wallet.balance(), Amount::new(50));
        assert_eq!(bank.balance_of(&bob), Amount::new(50));
    }

    #[test]
    fn test_wallet_send_not_owner() {
        let owner = Address::from_label("owner");
        let mut bank = Bank::new();
        let mut wallet = EtherWallet::new(owner);
        wallet.deposit(Amount::new(100)).unwrap();

        let err = wallet
            .send(Address::from_label("eve"), owner, Amount::new(50), &mut bank)
            .unwrap_err();
        assert_eq!(err, WalletError::NotOwner);
        assert_eq!(err.to_string(), "sender is not allowed");
        assert_eq!(wallet.balance(), Amount::new(100));
    }

    #[test]
    fn test_wallet_overdraw_and_failed_transfer() {
        let owner = Address::from_label("owner");
        let bob = Address::from_label("bob");
        let mut bank = Bank::new();
        let mut wallet = EtherWallet::new(owner);
        wallet.deposit(Amount::new(10)).unwrap();

        assert!(matches!(
            wallet.send(owner, bob, Amount::new(11), &mut bank),
            Err(WalletError::InsufficientBalance { .. })
        ));

        bank.fail_next(1);
        assert!(matches!(
            wallet.send(owner, bob, Amount::new(5), &mut bank),
            Err(WalletError::TransferFailed(_))
        ));
        assert_eq!(wallet.balance(), Amount::new(10));
    }
}
