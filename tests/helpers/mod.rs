//! # Test Helpers
//!
//! Shared setup for the scenario tests. Each test drives the contract
//! directly through the `rlib`, switching caller, block height and block
//! time with `testing_env!` between calls. Storage persists across context
//! switches, so a test reads like a sequence of transactions.
//!
//! ## Accounts
//!
//! | Constant | Role |
//! |----------|------|
//! | `OWNER` | Policy authority and default fee recipient |
//! | `KEEPER` | Harvest authority |
//! | `ASSET` | Underlying NEP-141 token |
//! | `STRATEGY` | Yield strategy account |
//! | `ALICE`, `BOB` | Holders |

#![allow(dead_code)]

use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
use near_contract_standards::fungible_token::receiver::FungibleTokenReceiver;
use near_contract_standards::storage_management::StorageManagement;
use near_sdk::json_types::U128;
use near_sdk::test_utils::VMContextBuilder;
use near_sdk::{
    testing_env, AccountId, NearToken, PromiseOrValue, PromiseResult, RuntimeFeesConfig,
};
use yield_vault::fees::FeeSchedule;
use yield_vault::policy::DepositLimits;
use yield_vault::vault::DepositMessage;
use yield_vault::{Contract, VaultError};

pub const VAULT: &str = "vault.test";
pub const OWNER: &str = "owner.test";
pub const KEEPER: &str = "keeper.test";
pub const ASSET: &str = "usdc.test";
pub const STRATEGY: &str = "farm.test";
pub const ALICE: &str = "alice.test";
pub const BOB: &str = "bob.test";

/// Price per full share at 1:1.
pub const ONE: u128 = 1_000_000_000_000_000_000;

pub fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

/// Switches the caller, attached yoctoNEAR, block height and block time (seconds).
pub fn ctx(predecessor: &str, deposit_yocto: u128, block_height: u64, timestamp_secs: u64) {
    let mut builder = VMContextBuilder::new();
    builder
        .current_account_id(account(VAULT))
        .predecessor_account_id(account(predecessor))
        .attached_deposit(NearToken::from_yoctonear(deposit_yocto))
        .block_height(block_height)
        .block_timestamp(timestamp_secs * 1_000_000_000);
    testing_env!(builder.build());
}

/// Runs the next call as the vault's own callback, with `result` as the
/// outcome of the promise it is chained on.
pub fn callback_ctx(result: PromiseResult) {
    let mut builder = VMContextBuilder::new();
    builder
        .current_account_id(account(VAULT))
        .predecessor_account_id(account(VAULT));
    testing_env!(
        builder.build(),
        near_sdk::test_vm_config(),
        RuntimeFeesConfig::test(),
        Default::default(),
        vec![result]
    );
}

pub fn metadata() -> FungibleTokenMetadata {
    FungibleTokenMetadata {
        spec: "ft-1.0.0".to_string(),
        name: "USDC Vault Shares".to_string(),
        symbol: "yvUSDC".to_string(),
        icon: None,
        reference: None,
        reference_hash: None,
        decimals: 6,
    }
}

/// Deploys a vault at block 0, time 0, with a separate keeper.
pub fn new_vault() -> Contract {
    new_vault_with(None, None)
}

pub fn new_vault_with(fees: Option<FeeSchedule>, limits: Option<DepositLimits>) -> Contract {
    ctx(VAULT, 0, 0, 0);
    Contract::init(
        account(OWNER),
        account(ASSET),
        metadata(),
        Some(account(KEEPER)),
        fees,
        limits,
    )
}

/// Pays the share token's storage minimum for `holder`, unless already registered.
pub fn register(vault: &mut Contract, holder: &str) {
    if vault.storage_balance_of(account(holder)).is_some() {
        return;
    }
    let min = vault.storage_balance_bounds().min;
    ctx(holder, min.as_yoctonear(), 0, 0);
    vault.storage_deposit(None, None);
}

/// Registers the share receiver and deposits `amount` for `sender` at
/// `block_height`, as the asset token's receiver hook would.
pub fn deposit(
    vault: &mut Contract,
    sender: &str,
    amount: u128,
    block_height: u64,
) -> Result<u128, VaultError> {
    deposit_msg(vault, sender, amount, DepositMessage::default(), block_height)
}

pub fn deposit_msg(
    vault: &mut Contract,
    sender: &str,
    amount: u128,
    msg: DepositMessage,
    block_height: u64,
) -> Result<u128, VaultError> {
    let receiver = msg
        .receiver_id
        .clone()
        .unwrap_or_else(|| account(sender));
    register(vault, receiver.as_str());
    ctx(ASSET, 0, block_height, 0);
    vault
        .handle_deposit(account(sender), U128(amount), msg)
        .map(|shares| shares.0)
}

/// Sends `amount` of the asset to the vault with `ft_transfer_call` message `msg`.
pub fn ft_on_transfer(vault: &mut Contract, sender: &str, amount: u128, msg: &str, block_height: u64) {
    register(vault, sender);
    ctx(ASSET, 0, block_height, 0);
    let _ = vault.ft_on_transfer(account(sender), U128(amount), msg.to_string());
}

/// Withdraws `shares` for `holder` at `block_height` with 1 yoctoNEAR attached.
///
/// Returns the assets taken out of the idle balance for the transfer.
pub fn withdraw(
    vault: &mut Contract,
    holder: &str,
    shares: u128,
    block_height: u64,
) -> Result<u128, VaultError> {
    ctx(holder, 1, block_height, 0);
    let idle_before = vault.idle_assets;
    let result = vault.withdraw(U128(shares));
    result.map(|_| idle_before - vault.idle_assets)
}

/// Sets emergency shutdown as the owner.
pub fn shutdown(vault: &mut Contract, active: bool) -> Result<PromiseOrValue<bool>, VaultError> {
    ctx(OWNER, 0, 0, 0);
    vault.set_emergency_shutdown(active)
}

/// Points the vault at `STRATEGY` and moves all idle assets into it.
pub fn deploy_to_strategy(vault: &mut Contract) -> u128 {
    ctx(OWNER, 0, 0, 0);
    vault.set_strategy(Some(account(STRATEGY))).unwrap();
    ctx(KEEPER, 0, 0, 0);
    let amount = vault.idle_assets;
    let _ = vault.earn().unwrap();
    amount
}

/// Reports strategy holdings as the strategy account.
pub fn report(vault: &mut Contract, balance: u128) {
    ctx(STRATEGY, 0, 0, 0);
    vault.report_strategy_balance(U128(balance)).unwrap();
}

pub fn shares_of(vault: &Contract, holder: &str) -> u128 {
    vault.shares_of(&account(holder))
}

/// Asserts that the share supply equals the sum of the given holders' balances.
pub fn assert_supply_matches(vault: &Contract, holders: &[&str]) {
    let sum: u128 = holders.iter().map(|h| shares_of(vault, h)).sum();
    assert_eq!(vault.total_shares(), sum, "share supply out of sync with balances");
}
