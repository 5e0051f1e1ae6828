//! # Vault Standards Module
//!
//! Share accounting and pricing for the vault.
//!
//! ## Module Organization
//!
//! - [`core`]: Read-only vault trait and pure pricing functions
//! - [`events`]: Structured event logging for deposits, withdrawals and harvests
//! - [`internal`]: Share ledger primitives and state-bound conversions
//! - [`mul_div`]: Safe multiplication and division with configurable rounding

pub mod core;
pub mod events;
pub mod internal;
pub mod mul_div;

pub use core::*;
