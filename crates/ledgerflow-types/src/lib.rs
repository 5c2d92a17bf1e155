//! Ledgerflow Types - Core type definitions shared by every Ledgerflow crate.
//!
//! This crate provides:
//! - Addresses (20-byte identity keys, Bech32m encoded)
//! - Amounts (integer currency in the smallest unit)
//! - Timestamps (seconds)

pub mod address;
pub mod amount;
pub mod timestamp;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use amount::Amount;
pub use timestamp::Timestamp;
pub use error::TypesError;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Address, Amount, Timestamp, TypesError};
}
