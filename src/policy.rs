//! # Policy Guard
//!
//! Deposit and withdrawal checks. The functions here are pure; callers pass
//! in the state they read so the same rules run on chain and in tests.
//!
//! ## Deposit order
//!
//! 1. Emergency shutdown blocks deposits
//! 2. Amount must be positive and reach the minimum
//! 3. Total managed assets after the deposit must stay under the vault-wide cap
//!
//! ## Withdraw order
//!
//! 1. Shares must be positive and held
//! 2. No withdrawal in the block of the holder's last deposit
//!
//! Shutdown never blocks withdrawals.

use near_sdk::{json_types::U128, near};

use crate::error::VaultError;

/// Deposit bounds. Zero disables a bound.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepositLimits {
    /// Smallest accepted single deposit.
    pub min: U128,
    /// Cap on total managed assets after a deposit.
    pub max: U128,
}

impl DepositLimits {
    pub const fn unlimited() -> Self {
        Self {
            min: U128(0),
            max: U128(0),
        }
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        let (min, max) = (self.min.0, self.max.0);
        if min != 0 && max != 0 && min > max {
            return Err(VaultError::InvalidDepositLimits { min, max });
        }
        Ok(())
    }
}

/// Validates a deposit of `amount` against `total_assets` managed before it.
pub fn check_deposit(
    emergency_shutdown: bool,
    limits: &DepositLimits,
    total_assets: u128,
    amount: u128,
) -> Result<(), VaultError> {
    if emergency_shutdown {
        return Err(VaultError::ShutdownActive);
    }

    let min = limits.min.0;
    if amount == 0 || amount < min {
        return Err(VaultError::AmountTooSmall {
            amount,
            min: min.max(1),
        });
    }

    let max = limits.max.0;
    if max != 0 {
        let total_after = total_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        if total_after > max {
            return Err(VaultError::MaxDepositReached { total_after, max });
        }
    }

    Ok(())
}

/// Validates a withdrawal of `shares` by a holder owning `balance`.
///
/// `last_deposit_block` is the block height of the holder's latest deposit.
pub fn check_withdraw(
    shares: u128,
    balance: u128,
    last_deposit_block: Option<u64>,
    block_height: u64,
) -> Result<(), VaultError> {
    if shares == 0 || shares > balance {
        return Err(VaultError::InsufficientShares {
            requested: shares,
            available: balance,
        });
    }

    if last_deposit_block == Some(block_height) {
        return Err(VaultError::SameBlockWithdrawal { block_height });
    }

    Ok(())
}
