//! # Internal Vault Operations
//!
//! The share ledger primitives and the state-bound side of pricing. These
//! functions implement the core vault accounting used by the public API.
//!
//! ## Key Functions
//!
//! - `internal_mint` / `internal_burn`: the only writers of share balances
//! - `internal_register_if_needed`: vault-paid registration for fee recipients
//! - `internal_total_managed_assets`: idle assets plus the strategy balance
//! - `internal_convert_to_shares_deposit`: shares minted for a deposit
//! - `internal_convert_to_assets`: assets paid for burning shares
//! - `internal_execute_withdrawal`: burns shares and sends assets (CEI)

use near_contract_standards::fungible_token::{
    core::{ext_ft_core, FungibleTokenCore},
    events::{FtBurn, FtMint},
};
use near_sdk::{env, ext_contract, json_types::U128, AccountId, Gas, NearToken, Promise};

use super::core::{
    assets_for_withdraw, price_per_full_share, shares_for_deposit, shares_for_withdraw,
};
use crate::error::VaultError;
use crate::strategy::Strategy;
use crate::Contract;

/// Gas allocation for asset transfer during withdrawal.
pub const GAS_FOR_FT_TRANSFER: Gas = Gas::from_tgas(30);

/// Gas allocation for the `resolve_withdraw` callback.
pub const GAS_FOR_RESOLVE_WITHDRAW: Gas = Gas::from_tgas(10);

// ============================================================================
// External Contract Interface
// ============================================================================

/// Callback interface for settling outbound asset transfers.
#[ext_contract(ext_self)]
pub trait _ExtSelf {
    /// Called after asset transfer to finalize or rollback withdrawal.
    fn resolve_withdraw(&mut self, owner: AccountId, shares: U128, assets: U128) -> U128;

    /// Called after a strategy allocation transfer.
    fn resolve_earn(&mut self, amount: U128) -> U128;

    /// Called after a `divest` request to the strategy.
    fn resolve_recall(&mut self, amount: U128) -> bool;
}

// ============================================================================
// Contract Implementation
// ============================================================================

impl Contract {
    /// Total shares outstanding.
    pub fn total_shares(&self) -> u128 {
        self.token.ft_total_supply().0
    }

    /// Share balance of `holder`, zero if unregistered.
    pub fn shares_of(&self, holder: &AccountId) -> u128 {
        self.token.ft_balance_of(holder.clone()).0
    }

    /// Registers `holder` on the share token with storage paid by the vault.
    ///
    /// Only for accounts the vault itself pays, such as the fee recipient.
    /// Depositors register through `storage_deposit`.
    pub fn internal_register_if_needed(&mut self, holder: &AccountId) {
        if !self.token.accounts.contains_key(holder) {
            self.token.internal_register_account(holder);
        }
    }

    /// Mints `shares` to `holder`. Minting zero is a no-op.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AccountNotRegistered`] if `holder` has no storage registration
    /// - [`VaultError::ArithmeticOverflow`] if the supply would overflow
    pub fn internal_mint(
        &mut self,
        holder: &AccountId,
        shares: u128,
        memo: &str,
    ) -> Result<(), VaultError> {
        if shares == 0 {
            return Ok(());
        }
        if !self.token.accounts.contains_key(holder) {
            return Err(VaultError::AccountNotRegistered {
                account_id: holder.clone(),
            });
        }
        self.token
            .total_supply
            .checked_add(shares)
            .ok_or(VaultError::ArithmeticOverflow)?;

        self.token.internal_deposit(holder, shares);

        FtMint {
            owner_id: holder,
            amount: U128(shares),
            memo: Some(memo),
        }
        .emit();
        Ok(())
    }

    /// Burns `shares` from `holder`.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientShares`] if the holder owns fewer.
    pub fn internal_burn(
        &mut self,
        holder: &AccountId,
        shares: u128,
        memo: &str,
    ) -> Result<(), VaultError> {
        let available = self.shares_of(holder);
        if shares > available {
            return Err(VaultError::InsufficientShares {
                requested: shares,
                available,
            });
        }
        if shares == 0 {
            return Ok(());
        }

        self.token.internal_withdraw(holder, shares);

        FtBurn {
            owner_id: holder,
            amount: U128(shares),
            memo: Some(memo),
        }
        .emit();
        Ok(())
    }

    /// Idle assets plus the strategy's balance, read fresh.
    pub fn internal_total_managed_assets(&self) -> Result<u128, VaultError> {
        self.idle_assets
            .checked_add(self.strategy.balance())
            .ok_or(VaultError::ArithmeticOverflow)
    }

    /// Converts a deposit amount to shares at the current price.
    ///
    /// Uses 1:1 while no shares exist; otherwise
    /// `amount * total_shares / total_managed_assets`, floored.
    pub fn internal_convert_to_shares_deposit(&self, amount: u128) -> Result<u128, VaultError> {
        shares_for_deposit(
            amount,
            self.total_shares(),
            self.internal_total_managed_assets()?,
        )
    }

    /// Converts shares to the assets a withdrawal pays, floored.
    pub fn internal_convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        assets_for_withdraw(
            shares,
            self.total_shares(),
            self.internal_total_managed_assets()?,
        )
    }

    /// Shares that must be burnt to receive `assets`, rounded up.
    pub fn internal_convert_to_shares_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        shares_for_withdraw(
            assets,
            self.total_shares(),
            self.internal_total_managed_assets()?,
        )
    }

    pub fn internal_price_per_full_share(&self) -> Result<u128, VaultError> {
        price_per_full_share(self.internal_total_managed_assets()?, self.total_shares())
    }

    /// Initiates an asset transfer with a resolution callback.
    pub fn internal_transfer_assets_with_callback(
        &self,
        receiver_id: AccountId,
        amount: u128,
        shares: u128,
    ) -> Promise {
        // =====================================================================
        // Cross-Contract Call: Transfer Assets to Receiver
        // =====================================================================
        // The `resolve_withdraw` callback emits the withdraw event on success
        // or re-mints the burnt shares and restores idle assets on failure.
        // =====================================================================
        ext_ft_core::ext(self.asset.clone())
            .with_attached_deposit(NearToken::from_yoctonear(1))
            .with_static_gas(GAS_FOR_FT_TRANSFER)
            .ft_transfer(receiver_id.clone(), U128(amount), Some("Withdrawal".to_string()))
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE_WITHDRAW)
                    .resolve_withdraw(receiver_id, U128(shares), U128(amount)),
            )
    }

    /// Executes a withdrawal following the CEI (Checks-Effects-Interactions) pattern.
    ///
    /// 1. **Checks**: assets are positive and held idle
    /// 2. **Effects**: burns shares and reduces idle assets
    /// 3. **Interactions**: transfers assets via cross-contract call
    pub fn internal_execute_withdrawal(
        &mut self,
        owner: AccountId,
        shares_to_burn: u128,
        assets_to_transfer: u128,
    ) -> Result<Promise, VaultError> {
        // Checks
        if assets_to_transfer == 0 {
            return Err(VaultError::NothingToWithdraw);
        }
        if assets_to_transfer > self.idle_assets {
            return Err(VaultError::InsufficientLiquidity {
                requested: assets_to_transfer,
                available: self.idle_assets,
            });
        }

        // Effects
        self.internal_burn(&owner, shares_to_burn, "Withdrawal")?;
        self.idle_assets -= assets_to_transfer;

        // Interactions
        Ok(self.internal_transfer_assets_with_callback(owner, assets_to_transfer, shares_to_burn))
    }

    /// Undoes a withdrawal whose asset transfer failed.
    pub fn internal_rollback_withdrawal(
        &mut self,
        owner: &AccountId,
        shares: u128,
        assets: u128,
    ) -> Result<(), VaultError> {
        let idle = self
            .idle_assets
            .checked_add(assets)
            .ok_or(VaultError::ArithmeticOverflow)?;
        // The holder may have unregistered while the transfer was in flight.
        self.internal_register_if_needed(owner);
        self.internal_mint(owner, shares, "Withdrawal rollback")?;
        self.idle_assets = idle;

        env::log_str(&format!(
            "withdraw_rollback owner={} shares={} assets={}",
            owner, shares, assets
        ));
        Ok(())
    }
}
