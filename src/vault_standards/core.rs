//! # Vault Core
//!
//! The read-only vault interface and the pricing arithmetic behind it.
//! Pricing functions are pure: they take the share supply and the total
//! managed assets read fresh by the caller, and never touch state.

use near_contract_standards::fungible_token::core::FungibleTokenCore;
use near_sdk::{json_types::U128, AccountId};
use uint::construct_uint;

use super::mul_div::{mul_div, Rounding};
use crate::error::VaultError;

construct_uint! {
    pub struct U256(4);
}

/// Fixed-point scale of the price per full share (`10^18`).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Read-only vault views exposed alongside the share token.
pub trait VaultCore: FungibleTokenCore {
    /// The underlying asset token.
    fn asset(&self) -> AccountId;
    /// Idle assets plus the strategy's balance.
    fn total_assets(&self) -> U128;
    /// Shares a deposit of `assets` would mint right now.
    fn convert_to_shares(&self, assets: U128) -> U128;
    /// Assets a withdrawal of `shares` would pay out right now.
    fn convert_to_assets(&self, shares: U128) -> U128;
    /// Shares that must be burnt to receive `assets`, rounded up.
    fn preview_withdraw(&self, assets: U128) -> U128;
    /// Total assets per share, scaled by [`SCALE`].
    fn get_price_per_full_share(&self) -> U128;
}

/// Shares minted for a deposit of `amount`.
///
/// The first deposit into an empty vault mints 1:1. Afterwards shares are
/// `amount * total_shares / total_assets`, floored, where `total_assets` is
/// measured before the deposit lands.
pub fn shares_for_deposit(
    amount: u128,
    total_shares: u128,
    total_assets: u128,
) -> Result<u128, VaultError> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div(amount, total_shares, total_assets, Rounding::Down)
}

/// Assets paid out for burning `shares`, floored.
pub fn assets_for_withdraw(
    shares: u128,
    total_shares: u128,
    total_assets: u128,
) -> Result<u128, VaultError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div(shares, total_assets, total_shares, Rounding::Down)
}

/// Shares that must be burnt to receive `assets`, rounded up.
pub fn shares_for_withdraw(
    assets: u128,
    total_shares: u128,
    total_assets: u128,
) -> Result<u128, VaultError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div(assets, total_shares, total_assets, Rounding::Up)
}

/// Price per full share; exactly [`SCALE`] while no shares exist.
pub fn price_per_full_share(total_assets: u128, total_shares: u128) -> Result<u128, VaultError> {
    if total_shares == 0 {
        return Ok(SCALE);
    }
    mul_div(total_assets, SCALE, total_shares, Rounding::Down)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_one_to_one() {
        assert_eq!(shares_for_deposit(1_000, 0, 0).unwrap(), 1_000);
        assert_eq!(price_per_full_share(0, 0).unwrap(), SCALE);
    }

    #[test]
    fn deposits_are_proportional() {
        // 1000 shares backed by 1100 assets.
        let shares = shares_for_deposit(550, 1_000, 1_100).unwrap();
        assert_eq!(shares, 500);
    }

    #[test]
    fn deposit_rounds_in_favor_of_vault() {
        // 10 * 3 / 7 = 4.28..
        assert_eq!(shares_for_deposit(10, 3, 7).unwrap(), 4);
    }

    #[test]
    fn withdraw_rounds_in_favor_of_vault() {
        // 1 * 7 / 3 = 2.33..
        assert_eq!(assets_for_withdraw(1, 3, 7).unwrap(), 2);
        assert_eq!(shares_for_withdraw(2, 3, 7).unwrap(), 1);
        assert_eq!(shares_for_withdraw(3, 3, 7).unwrap(), 2);
    }

    #[test]
    fn price_tracks_profit() {
        assert_eq!(
            price_per_full_share(1_100, 1_000).unwrap(),
            1_100_000_000_000_000_000
        );
    }

    #[test]
    fn deposit_into_drained_vault_fails() {
        // Shares outstanding but nothing backing them: no price exists.
        assert_eq!(
            shares_for_deposit(100, 1_000, 0),
            Err(VaultError::ArithmeticOverflow)
        );
    }

    #[test]
    fn price_overflow_is_reported() {
        assert_eq!(
            price_per_full_share(u128::MAX, 1),
            Err(VaultError::ArithmeticOverflow)
        );
    }
}
