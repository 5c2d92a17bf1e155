//! Fixed-size lottery.
//!
//! The admin opens a round of `count` bets of exactly `size` each. The bet
//! that fills the round draws a winner, who receives the pot minus the house
//! fee. The admin may cancel an open round, refunding every bettor.

use ledgerflow_core::{FundsTransfer, TransferError};
use ledgerflow_types::{Address, Amount};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LotteryState {
    Idle,
    Betting,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LotteryError {
    #[error("only admin")]
    NotAdmin,

    #[error("current state does not allow this")]
    InvalidState(LotteryState),

    #[error("can only bet exactly the bet size")]
    WrongBetSize { expected: Amount, got: Amount },

    #[error("Invalid round: {0}")]
    InvalidRound(String),

    #[error("House fee must be at most 100%, got {0}")]
    InvalidFee(u8),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// Result of a successful bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetOutcome {
    /// Round still filling
    Joined { players: usize, remaining: usize },
    /// Round filled and paid out
    Drawn { winner: Address, payout: Amount },
}

/// Lottery contract state.
#[derive(Debug, Clone)]
pub struct Lottery {
    admin: Address,
    house_fee_percent: u8,
    state: LotteryState,
    bet_count: usize,
    bet_size: Amount,
    players: Vec<Address>,
    house_balance: Amount,
}

impl Lottery {
    pub fn new(admin: Address, house_fee_percent: u8) -> Result<Self, LotteryError> {
        if house_fee_percent > 100 {
            return Err(LotteryError::InvalidFee(house_fee_percent));
        }
        Ok(Self {
            admin,
            house_fee_percent,
            state: LotteryState::Idle,
            bet_count: 0,
            bet_size: Amount::ZERO,
            players: Vec::new(),
            house_balance: Amount::ZERO,
        })
    }

    pub fn state(&self) -> LotteryState {
        self.state
    }

    pub fn bet_count(&self) -> usize {
        self.bet_count
    }

    pub fn bet_size(&self) -> Amount {
        self.bet_size
    }

    pub fn players(&self) -> &[Address] {
        &self.players
    }

    /// Fees retained from completed rounds.
    pub fn house_balance(&self) -> Amount {
        self.house_balance
    }

    fn require_state(&self, state: LotteryState) -> Result<(), LotteryError> {
        if self.state != state {
            return Err(LotteryError::InvalidState(self.state));
        }
        Ok(())
    }

    /// Open a round of `count` bets of `size` each.
    pub fn create_bet(&mut self, caller: Address, count: usize, size: Amount) -> Result<(), LotteryError> {
        if caller != self.admin {
            return Err(LotteryError::NotAdmin);
        }
        self.require_state(LotteryState::Idle)?;

        if count == 0 || size.is_zero() {
            return Err(LotteryError::InvalidRound(
                "count and size must be positive".to_string(),
            ));
        }
        size.checked_mul(count as u128).ok_or(LotteryError::Overflow)?;

        self.bet_count = count;
        self.bet_size = size;
        self.state = LotteryState::Betting;
        tracing::info!("Lottery round opened: {} bets of {}", count, size);
        Ok(())
    }

    /// Place a bet; the bet that fills the round triggers the draw.
    pub fn bet<R: Rng + ?Sized>(
        &mut self,
        caller: Address,
        value: Amount,
        rng: &mut R,
        transfer: &mut impl FundsTransfer,
    ) -> Result<BetOutcome, LotteryError> {
        self.require_state(LotteryState::Betting)?;

        if value != self.bet_size {
            return Err(LotteryError::WrongBetSize {
                expected: self.bet_size,
                got: value,
            });
        }

        if self.players.len() + 1 < self.bet_count {
            self.players.push(caller);
            return Ok(BetOutcome::Joined {
                players: self.players.len(),
                remaining: self.bet_count - self.players.len(),
            });
        }

        let pot = self
            .bet_size
            .checked_mul(self.bet_count as u128)
            .ok_or(LotteryError::Overflow)?;
        let payout = pot
            .percent_of(100 - self.house_fee_percent)
            .ok_or(LotteryError::Overflow)?;
        let fee = pot.saturating_sub(payout);

        let index = rng.gen_range(0..self.bet_count);
        let winner = if index == self.players.len() {
            caller
        } else {
            self.players[index]
        };

        transfer.transfer(winner, payout)?;

        self.house_balance = self.house_balance.saturating_add(fee);
        self.players.clear();
        self.state = LotteryState::Idle;
        tracing::info!("Lottery drawn: {} wins {}", winner.short(), payout);
        Ok(BetOutcome::Drawn { winner, payout })
    }

    /// Abort the open round and refund every bettor.
    pub fn cancel(&mut self, caller: Address, transfer: &mut impl FundsTransfer) -> Result<usize, LotteryError> {
        self.require_state(LotteryState::Betting)?;
        if caller != self.admin {
            return Err(LotteryError::NotAdmin);
        }

        let refunded = self.players.len();
        // Refunds that went through are dropped from the list, so a retry
        // only pays the rest.
        while let Some(player) = self.players.first().copied() {
            transfer.transfer(player, self.bet_size)?;
            self.players.remove(0);
        }

        self.state = LotteryState::Idle;
        tracing::info!("Lottery round cancelled, {} bets refunded", refunded);
        Ok(refunded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerflow_core::Bank;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn admin() -> Address {
        Address::from_label("admin")
    }

    fn player(i: usize) -> Address {
        Address::from_label(&format!("player{}", i))
    }

    #[test]
    fn test_create_bet_requires_admin() {
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        assert_eq!(
            lottery.create_bet(player(1), 5, Amount::new(10)),
            Err(LotteryError::NotAdmin)
        );
    }

    #[test]
    fn test_create_bet_requires_idle() {
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        lottery.create_bet(admin(), 5, Amount::new(10)).unwrap();
        let err = lottery.create_bet(admin(), 5, Amount::new(10)).unwrap_err();
        assert_eq!(err.to_string(), "current state does not allow this");
    }

    #[test]
    fn test_create_bet() {
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        lottery.create_bet(admin(), 5, Amount::new(10)).unwrap();
        assert_eq!(lottery.bet_size(), Amount::new(10));
        assert_eq!(lottery.bet_count(), 5);
        assert_eq!(lottery.state(), LotteryState::Betting);
    }

    #[test]
    fn test_bet_guards() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut bank = Bank::new();
        let mut lottery = Lottery::new(admin(), 2).unwrap();

        assert!(matches!(
            lottery.bet(player(1), Amount::new(1000), &mut rng, &mut bank),
            Err(LotteryError::InvalidState(LotteryState::Idle))
        ));

        lottery.create_bet(admin(), 5, Amount::new(10)).unwrap();
        let err = lottery
            .bet(player(1), Amount::new(1000), &mut rng, &mut bank)
            .unwrap_err();
        assert_eq!(err.to_string(), "can only bet exactly the bet size");
    }

    #[test]
    fn test_full_round_pays_winner() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut bank = Bank::new();
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        lottery.create_bet(admin(), 3, Amount::new(1000)).unwrap();

        assert_eq!(
            lottery.bet(player(0), Amount::new(1000), &mut rng, &mut bank).unwrap(),
            BetOutcome::Joined { players: 1, remaining: 2 }
        );
        lottery.bet(player(1), Amount::new(1000), &mut rng, &mut bank).unwrap();
        let outcome = lottery
            .bet(player(2), Amount::new(1000), &mut rng, &mut bank)
            .unwrap();

        match outcome {
            BetOutcome::Drawn { winner, payout } => {
                assert_eq!(payout, Amount::new(2940));
                assert!((0..3).map(player).any(|p| p == winner));
                assert_eq!(bank.balance_of(&winner), Amount::new(2940));
            }
            other => panic!("expected a draw, got {:?}", other),
        }
        assert_eq!(lottery.house_balance(), Amount::new(60));
        assert_eq!(lottery.state(), LotteryState::Idle);
        assert!(lottery.players().is_empty());
    }

    #[test]
    fn test_failed_payout_keeps_round_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bank = Bank::new();
        let mut lottery = Lottery::new(admin(), 0).unwrap();
        lottery.create_bet(admin(), 1, Amount::new(5)).unwrap();

        bank.fail_next(1);
        assert!(lottery.bet(player(0), Amount::new(5), &mut rng, &mut bank).is_err());
        assert_eq!(lottery.state(), LotteryState::Betting);

        let outcome = lottery.bet(player(0), Amount::new(5), &mut rng, &mut bank).unwrap();
        assert_eq!(outcome, BetOutcome::Drawn { winner: player(0), payout: Amount::new(5) });
    }

    #[test]
    fn test_cancel_guards() {
        let mut bank = Bank::new();
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        assert!(matches!(
            lottery.cancel(player(1), &mut bank),
            Err(LotteryError::InvalidState(_))
        ));

        lottery.create_bet(admin(), 5, Amount::new(1000)).unwrap();
        assert_eq!(lottery.cancel(player(1), &mut bank), Err(LotteryError::NotAdmin));
    }

    #[test]
    fn test_cancel_refunds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut bank = Bank::new();
        let mut lottery = Lottery::new(admin(), 2).unwrap();
        lottery.create_bet(admin(), 5, Amount::new(1000)).unwrap();
        lottery.bet(player(1), Amount::new(1000), &mut rng, &mut bank).unwrap();
        lottery.bet(player(2), Amount::new(1000), &mut rng, &mut bank).unwrap();

        assert_eq!(lottery.cancel(admin(), &mut bank).unwrap(), 2);
        assert_eq!(lottery.state(), LotteryState::Idle);
        assert_eq!(bank.balance_of(&player(1)), Amount::new(1000));
        assert_eq!(bank.balance_of(&player(2)), Amount::new(1000));
    }

    #[test]
    fn test_invalid_fee() {
        assert_eq!(Lottery::new(admin(), 101).unwrap_err(), LotteryError::InvalidFee(101));
    }
}
