//! Ledgerflow DAO - investor-funded proposals with stake-weighted votes.
//!
//! This crate provides:
//! - Contribution intake during a fixed window
//! - Proposal lifecycle (create, vote, execute)
//! - Quorum checks against total contributions
//! - Admin withdrawal of undisbursed funds
//!
//! Every operation is all-or-nothing. Disbursements go through a
//! [`ledgerflow_core::FundsTransfer`] and are rolled back if it refuses.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod investor;
pub mod ledger;
pub mod proposal;

pub use config::DaoConfig;
pub use engine::DaoEngine;
pub use error::{DaoError, DaoErrorKind};
pub use events::DaoEvent;
pub use investor::Investor;
pub use ledger::Ledger;
pub use proposal::{Proposal, ProposalRegistry};
