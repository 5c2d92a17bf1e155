//! Ledgerflow Core - the collaborators a contract workflow runs against.
//!
//! Contracts never read wall time or move value themselves. They are handed:
//! - a [`Clock`] that yields non-decreasing timestamps
//! - a [`FundsTransfer`] that pays a recipient and may refuse
//!
//! [`ManualClock`] and [`Bank`] are the in-memory implementations used by
//! tests and the scenario runner.

pub mod clock;
pub mod bank;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use bank::{Bank, FundsTransfer, SharedBank, TransferRecord};
pub use error::TransferError;
