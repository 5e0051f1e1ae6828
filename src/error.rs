//! # Vault Errors
//!
//! Every rejection the vault can produce. Contract methods that can fail
//! return `Result<_, VaultError>` under `#[handle_result]`; the runtime turns
//! an `Err` into a panic carrying the display string below, which rolls back
//! the whole receipt.

use near_sdk::{AccountId, FunctionError};
use thiserror::Error;

use crate::strategy::StrategyError;

/// Errors returned by vault operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, FunctionError)]
pub enum VaultError {
    /// Deposit attempted while emergency shutdown is on.
    #[error("emergency shutdown is active")]
    ShutdownActive,

    /// Deposit below the configured minimum, or one that would mint nothing.
    #[error("amount too small: {amount} (minimum {min})")]
    AmountTooSmall { amount: u128, min: u128 },

    /// Deposit would push total managed assets above the vault-wide cap.
    #[error("max deposit reached: total would be {total_after}, cap is {max}")]
    MaxDepositReached { total_after: u128, max: u128 },

    /// Withdraw or burn exceeds the holder's share balance.
    #[error("insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u128, available: u128 },

    /// Withdraw in the same block as a deposit by that holder.
    #[error("same block withdrawal at height {block_height}")]
    SameBlockWithdrawal { block_height: u64 },

    #[error("caller is not the keeper")]
    NotKeeper,

    #[error("caller is not the owner")]
    NotOwner,

    #[error("caller is not the strategy")]
    NotStrategy,

    /// Fee rate above its hard cap.
    #[error("fee too high: {requested} bps (cap {cap} bps)")]
    FeeTooHigh { requested: u16, cap: u16 },

    /// Fee cap above 100%.
    #[error("invalid fee cap: {cap} bps")]
    InvalidFeeCap { cap: u16 },

    #[error("invalid deposit limits: min {min} exceeds max {max}")]
    InvalidDepositLimits { min: u128, max: u128 },

    /// An intermediate value does not fit, or a division has no denominator.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Share receiver has no storage registration on the share token.
    #[error("account {account_id} is not registered")]
    AccountNotRegistered { account_id: AccountId },

    /// Minted shares fell below the depositor's `min_shares`.
    #[error("slippage exceeded: {shares} shares (minimum {min_shares})")]
    SlippageExceeded { shares: u128, min_shares: u128 },

    #[error("no assets to withdraw")]
    NothingToWithdraw,

    /// Requested assets are deployed to the strategy rather than held idle.
    #[error("insufficient liquidity: requested {requested}, idle {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    #[error("no strategy configured")]
    StrategyNotSet,

    /// Strategy replacement while the current one still holds principal.
    #[error("strategy still holds {principal} of principal")]
    StrategyNotEmpty { principal: u128 },

    #[error("strategy failure: {0}")]
    Strategy(#[from] StrategyError),
}
