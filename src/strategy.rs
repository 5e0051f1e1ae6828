//! # Strategy Module
//!
//! The vault's view of its yield-generating strategy. The ledger talks to
//! the strategy only through the synchronous [`Strategy`] trait, so harvest
//! can run against a copy of the position and commit it only when every
//! later step has succeeded.
//!
//! On chain the strategy is a separate account. [`StrategyPosition`] tracks
//! what the vault has handed to it (`principal`) and what it last reported
//! holding (`reported`). Funds move with NEP-141 transfers:
//!
//! 1. **Earn**: keeper moves idle assets to the strategy account
//! 2. **Report**: strategy account reports its current holdings
//! 3. **Harvest**: reported growth becomes principal, and fees are charged on it
//! 4. **Recall**: keeper (or shutdown) asks the strategy to send assets back
//! 5. **Divest**: strategy returns assets with `ft_transfer_call(.., "\"divest\"")`
//!
//! A divest larger than the principal carries the surplus as `pending_gain`,
//! so the next harvest still charges the performance fee on it.

use near_contract_standards::fungible_token::core::ext_ft_core;
use near_sdk::{
    env, ext_contract, json_types::U128, near, AccountId, Gas, NearToken, Promise,
    PromiseOrValue, PromiseResult,
};
use thiserror::Error;

use crate::access::Action;
use crate::error::VaultError;
use crate::vault_standards::events::VaultConfigUpdate;
use crate::vault_standards::internal::ext_self;
use crate::{Contract, ContractExt};

/// Gas allocation for the strategy allocation `ft_transfer`.
const GAS_FOR_STRATEGY_TRANSFER: Gas = Gas::from_tgas(30);

/// Gas allocation for the `resolve_earn` callback.
const GAS_FOR_RESOLVE_EARN: Gas = Gas::from_tgas(10);

/// Gas for the strategy's `divest`, which itself calls `ft_transfer_call`.
const GAS_FOR_STRATEGY_DIVEST: Gas = Gas::from_tgas(80);

const GAS_FOR_RESOLVE_RECALL: Gas = Gas::from_tgas(10);

/// Interface the strategy account exposes to the vault.
#[ext_contract(ext_strategy)]
pub trait StrategyAccount {
    /// Sends `amount` back with `ft_transfer_call(vault, amount, "\"divest\"")`.
    fn divest(&mut self, amount: U128);
}

/// Failures reported by a strategy collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("strategy balance overflow")]
    BalanceOverflow,

    #[error("strategy unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Synchronous interface to a yield source.
pub trait Strategy {
    /// Assets currently counted towards the vault's managed total.
    fn balance(&self) -> u128;

    /// Realizes pending yield and returns the gain. Never negative; a loss
    /// is absorbed into [`Strategy::balance`] instead.
    fn realize_gains(&mut self) -> Result<u128, StrategyError>;
}

/// The vault's position in its strategy account.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyPosition {
    /// Strategy account, `None` when the vault holds everything idle.
    pub account_id: Option<AccountId>,
    /// Assets counted in the vault's managed total.
    pub principal: U128,
    /// Holdings last reported by the strategy account.
    pub reported: U128,
    /// Returned assets beyond the principal, not yet charged fees on.
    pub pending_gain: U128,
}

impl StrategyPosition {
    pub fn new(account_id: Option<AccountId>) -> Self {
        Self {
            account_id,
            principal: U128(0),
            reported: U128(0),
            pending_gain: U128(0),
        }
    }

    /// Records assets handed to the strategy.
    pub fn allocate(&mut self, amount: u128) -> Result<(), StrategyError> {
        let principal = self
            .principal
            .0
            .checked_add(amount)
            .ok_or(StrategyError::BalanceOverflow)?;
        let reported = self
            .reported
            .0
            .checked_add(amount)
            .ok_or(StrategyError::BalanceOverflow)?;
        self.principal = U128(principal);
        self.reported = U128(reported);
        Ok(())
    }

    /// Records assets returned by the strategy.
    ///
    /// The part of `amount` above the principal is growth that never went
    /// through a harvest. It is added to `pending_gain` and returned.
    pub fn release(&mut self, amount: u128) -> Result<u128, StrategyError> {
        let surplus = amount.saturating_sub(self.principal.0);
        let pending_gain = self
            .pending_gain
            .0
            .checked_add(surplus)
            .ok_or(StrategyError::BalanceOverflow)?;

        self.principal = U128(self.principal.0.saturating_sub(amount));
        self.reported = U128(self.reported.0.saturating_sub(amount));
        self.pending_gain = U128(pending_gain);
        Ok(surplus)
    }

    /// Everything the strategy account should be holding for the vault.
    pub fn holdings(&self) -> u128 {
        self.principal.0.max(self.reported.0)
    }

    /// Stores the strategy's latest self-reported holdings.
    pub fn report(&mut self, balance: u128) {
        self.reported = U128(balance);
    }
}

impl Strategy for StrategyPosition {
    fn balance(&self) -> u128 {
        self.principal.0
    }

    fn realize_gains(&mut self) -> Result<u128, StrategyError> {
        let pending = self.pending_gain.0;
        self.pending_gain = U128(0);
        if self.account_id.is_none() {
            return Ok(pending);
        }

        let (principal, reported) = (self.principal.0, self.reported.0);
        if reported < principal {
            env::log_str(&format!(
                "strategy_loss principal={} reported={}",
                principal, reported
            ));
            self.principal = self.reported;
            return Ok(pending);
        }

        self.principal = self.reported;
        (reported - principal)
            .checked_add(pending)
            .ok_or(StrategyError::BalanceOverflow)
    }
}

#[near]
impl Contract {
    /// Moves every idle asset to the strategy account.
    ///
    /// Blocked during emergency shutdown. If the transfer fails,
    /// `resolve_earn` hands the amount back to the idle balance.
    ///
    /// # Returns
    ///
    /// The amount sent to the strategy, once `resolve_earn` settles.
    #[handle_result]
    pub fn earn(&mut self) -> Result<PromiseOrValue<U128>, VaultError> {
        self.authorize(Action::Earn)?;
        if self.emergency_shutdown {
            return Err(VaultError::ShutdownActive);
        }
        let strategy_id = self
            .strategy
            .account_id
            .clone()
            .ok_or(VaultError::StrategyNotSet)?;

        let amount = self.idle_assets;
        if amount == 0 {
            return Ok(PromiseOrValue::Value(U128(0)));
        }

        self.strategy.allocate(amount)?;
        self.idle_assets = 0;

        env::log_str(&format!("earn strategy={} amount={}", strategy_id, amount));

        let promise = ext_ft_core::ext(self.asset.clone())
            .with_attached_deposit(NearToken::from_yoctonear(1))
            .with_static_gas(GAS_FOR_STRATEGY_TRANSFER)
            .ft_transfer(strategy_id, U128(amount), Some("Strategy allocation".to_string()))
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE_EARN)
                    .resolve_earn(U128(amount)),
            );

        Ok(PromiseOrValue::Promise(promise))
    }

    /// Settles the allocation transfer started by `earn`.
    ///
    /// # Returns
    ///
    /// The amount now held by the strategy, zero if the transfer failed.
    #[private]
    pub fn resolve_earn(&mut self, amount: U128) -> U128 {
        match env::promise_result(0) {
            PromiseResult::Successful(_) => amount,
            _ => {
                if let Err(err) = self.internal_rollback_earn(amount.0) {
                    env::panic_str(&err.to_string());
                }
                U128(0)
            }
        }
    }

    /// Asks the strategy account to send assets back to the vault.
    ///
    /// `amount` defaults to everything the strategy holds. Assets arrive
    /// later as a divest through `ft_on_transfer`; nothing moves until then.
    /// Allowed during emergency shutdown.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotKeeper`] for any other caller
    /// - [`VaultError::StrategyNotSet`] without a strategy
    #[handle_result]
    pub fn recall(&mut self, amount: Option<U128>) -> Result<PromiseOrValue<bool>, VaultError> {
        self.authorize(Action::Recall)?;
        let amount = amount.map_or_else(|| self.strategy.holdings(), |amount| amount.0);
        self.internal_recall(amount)
    }

    /// Settles a recall request.
    ///
    /// # Returns
    ///
    /// Whether the strategy accepted the request.
    #[private]
    pub fn resolve_recall(&mut self, amount: U128) -> bool {
        match env::promise_result(0) {
            PromiseResult::Successful(_) => {
                env::log_str(&format!("recall_accepted amount={}", amount.0));
                true
            }
            _ => {
                env::log_str(&format!("recall_failed amount={}", amount.0));
                false
            }
        }
    }

    /// Records the strategy account's current holdings.
    ///
    /// Growth over the principal is realized, and charged fees on, at the
    /// next harvest.
    #[handle_result]
    pub fn report_strategy_balance(&mut self, balance: U128) -> Result<(), VaultError> {
        self.authorize(Action::ReportStrategy)?;
        self.strategy.report(balance.0);
        env::log_str(&format!("strategy_report balance={}", balance.0));
        Ok(())
    }

    /// Points the vault at a new strategy account, or none.
    ///
    /// # Errors
    ///
    /// [`VaultError::StrategyNotEmpty`] while the current strategy still
    /// holds principal.
    #[handle_result]
    pub fn set_strategy(&mut self, strategy_id: Option<AccountId>) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetStrategy)?;
        if self.strategy.principal.0 > 0 {
            return Err(VaultError::StrategyNotEmpty {
                principal: self.strategy.principal.0,
            });
        }

        let value = strategy_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let pending_gain = self.strategy.pending_gain;
        self.strategy = StrategyPosition::new(strategy_id);
        self.strategy.pending_gain = pending_gain;

        VaultConfigUpdate {
            updated_by: &caller,
            field: "strategy",
            value,
        }
        .emit();
        Ok(())
    }

    pub fn get_strategy(&self) -> StrategyPosition {
        self.strategy.clone()
    }
}

impl Contract {
    /// Restores idle assets after a failed allocation transfer.
    pub fn internal_rollback_earn(&mut self, amount: u128) -> Result<(), VaultError> {
        let idle = self
            .idle_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        self.strategy.release(amount)?;
        self.idle_assets = idle;
        env::log_str(&format!("earn_rollback amount={}", amount));
        Ok(())
    }

    /// Sends the strategy a `divest` request for `amount`, with
    /// `resolve_recall` as the callback. Skips the call when there is
    /// nothing to recall.
    pub fn internal_recall(&self, amount: u128) -> Result<PromiseOrValue<bool>, VaultError> {
        let strategy_id = self
            .strategy
            .account_id
            .clone()
            .ok_or(VaultError::StrategyNotSet)?;
        if amount == 0 {
            return Ok(PromiseOrValue::Value(false));
        }

        env::log_str(&format!("recall strategy={} amount={}", strategy_id, amount));

        let promise: Promise = ext_strategy::ext(strategy_id)
            .with_static_gas(GAS_FOR_STRATEGY_DIVEST)
            .divest(U128(amount))
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(GAS_FOR_RESOLVE_RECALL)
                    .resolve_recall(U128(amount)),
            );
        Ok(PromiseOrValue::Promise(promise))
    }

    /// Credits assets returned by the strategy account.
    ///
    /// Anything above the principal is held as pending gain for the next
    /// harvest.
    pub fn handle_divest(&mut self, sender_id: &AccountId, amount: u128) -> Result<(), VaultError> {
        if self.strategy.account_id.as_ref() != Some(sender_id) {
            return Err(VaultError::NotStrategy);
        }
        let idle = self
            .idle_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;

        let surplus = self.strategy.release(amount)?;
        self.idle_assets = idle;
        env::log_str(&format!(
            "divest strategy={} amount={} surplus={}",
            sender_id, amount, surplus
        ));
        Ok(())
    }
}
