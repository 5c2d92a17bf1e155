//! Ledgerflow contract exercises.
//!
//! Small contracts, each a handful of guarded state transitions. State
//! changing calls take the caller explicitly, attached value as an
//! [`Amount`](ledgerflow_types::Amount), and whichever collaborators
//! (clock, funds transfer, randomness) they need.

pub mod wallet;
pub mod split_payment;
pub mod lottery;
pub mod loan;
pub mod ticketing;
pub mod registry;
pub mod storage;
pub mod strings;
pub mod fibonacci;

pub use wallet::{EtherWallet, WalletError};
pub use split_payment::{SplitPayment, SplitPaymentError};
pub use lottery::{BetOutcome, Lottery, LotteryError, LotteryState};
pub use loan::{LoanError, LoanState, LoanStateMachine, LoanTerms};
pub use ticketing::{Event, EventTicketing, TicketingError};
pub use registry::{Registry, RegistryError, User};
pub use storage::SimpleStorage;
pub use fibonacci::{fib, FibonacciError};
pub use strings::{concatenate, length};

/// Contract version
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");
