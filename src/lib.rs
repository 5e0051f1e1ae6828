//! # Yield Vault Contract
//!
//! A NEAR smart contract that pools a NEP-141 asset, hands it to a
//! yield-generating strategy, and tracks each depositor's proportional claim
//! as vault shares. This contract enables:
//!
//! - **Vault Operations**: deposits through `ft_transfer_call`, withdrawals by burning shares
//! - **Pricing**: share price derived from total managed assets and share supply
//! - **Policy**: deposit limits, same-block withdrawal guard, emergency shutdown
//! - **Fees**: performance and management fees minted as shares on harvest
//! - **Roles**: owner for policy, keeper for harvest, strategy account for reports
//!
//! ## Architecture
//!
//! The contract is organized into several modules:
//! - [`vault`]: Deposit/withdraw entry points and the share token surface
//! - [`vault_standards`]: Share ledger, pricing and events
//! - [`policy`]: Deposit and withdrawal guards
//! - [`fees`]: Fee schedule and harvest
//! - [`strategy`]: Strategy trait and the on-chain strategy position
//! - [`access`]: Authorization table
//! - [`admin`]: Owner policy methods

use near_sdk::{
    env,
    json_types::{U128, U64},
    near,
    store::LookupMap,
    AccountId, BorshStorageKey, PanicOnDefault,
};

use near_contract_standards::fungible_token::{
    core_impl::FungibleToken, metadata::FungibleTokenMetadata,
};
use schemars::JsonSchema;

pub mod access;
mod admin;
pub mod error;
pub mod fees;
pub mod policy;
pub mod strategy;
pub mod vault;
pub mod vault_standards;

#[cfg(test)]
pub mod test_utils;

pub use error::VaultError;
use fees::FeeSchedule;
use policy::DepositLimits;
use strategy::StrategyPosition;

/// Nanoseconds in a second, for converting block timestamps.
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Storage keys for NEAR SDK collections.
#[near(serializers = [borsh])]
#[derive(BorshStorageKey)]
pub enum StorageKey {
    /// Storage prefix for the NEP-141 fungible token (vault shares).
    FungibleToken,
    /// Storage prefix for each holder's last deposit block height.
    LastDepositBlock,
}

/// Main contract state: the share ledger and the policy around it.
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    /// Policy authority.
    pub owner_id: AccountId,
    /// Harvest authority.
    pub keeper_id: AccountId,
    /// Receiver of fee shares; the owner when unset.
    pub fee_recipient: Option<AccountId>,
    /// Blocks new deposits (and strategy allocations) while set.
    pub emergency_shutdown: bool,

    // Vault State
    /// NEP-141 fungible token representing vault shares.
    pub token: FungibleToken,
    /// Metadata for the vault share token.
    pub metadata: FungibleTokenMetadata,
    /// Account ID of the underlying asset token (NEP-141).
    pub asset: AccountId,
    /// Assets held directly by the vault.
    pub idle_assets: u128,
    /// Assets handed to the strategy and its reported holdings.
    pub strategy: StrategyPosition,
    /// Fee rates and caps.
    pub fees: FeeSchedule,
    /// Deposit bounds.
    pub deposit_limits: DepositLimits,
    /// Block time of the last harvest, in seconds.
    pub last_harvest_timestamp: u64,
    /// Block height of each holder's most recent deposit.
    pub last_deposit_block: LookupMap<AccountId, u64>,
}

/// Snapshot of vault configuration and accounting for front ends.
#[derive(near_sdk::serde::Serialize, JsonSchema, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultInfoView {
    pub owner_id: String,
    pub keeper_id: String,
    pub fee_recipient: String,
    pub asset: String,
    pub strategy_id: Option<String>,
    pub emergency_shutdown: bool,
    pub performance_fee_bps: u16,
    pub management_fee_bps: u16,
    pub max_performance_fee_bps: u16,
    pub max_management_fee_bps: u16,
    pub deposit_min: String,
    pub deposit_max: String,
    pub idle_assets: String,
    pub strategy_balance: String,
    pub total_shares: String,
    pub last_harvest_timestamp: u64,
}

#[near]
impl Contract {
    /// Initializes the vault.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - Policy authority
    /// * `asset` - Account ID of the underlying NEP-141 asset token
    /// * `metadata` - Fungible token metadata for vault shares
    /// * `keeper_id` - Harvest authority, defaults to the owner
    /// * `fees` - Fee rates and caps, defaults to 10% / 2% capped at 30% / 5%
    /// * `deposit_limits` - Deposit bounds, defaults to none
    ///
    /// # Panics
    ///
    /// Panics if the fee schedule or deposit limits are invalid.
    #[init]
    #[private]
    pub fn init(
        owner_id: AccountId,
        asset: AccountId,
        metadata: FungibleTokenMetadata,
        keeper_id: Option<AccountId>,
        fees: Option<FeeSchedule>,
        deposit_limits: Option<DepositLimits>,
    ) -> Self {
        let fees = fees.unwrap_or_default();
        let deposit_limits = deposit_limits.unwrap_or(DepositLimits::unlimited());
        if let Err(err) = fees.validate().and_then(|_| deposit_limits.validate()) {
            env::panic_str(&err.to_string());
        }

        Self {
            keeper_id: keeper_id.unwrap_or_else(|| owner_id.clone()),
            owner_id,
            fee_recipient: None,
            emergency_shutdown: false,
            token: FungibleToken::new(StorageKey::FungibleToken),
            metadata,
            asset,
            idle_assets: 0,
            strategy: StrategyPosition::new(None),
            fees,
            deposit_limits,
            last_harvest_timestamp: Self::now_seconds(),
            last_deposit_block: LookupMap::new(StorageKey::LastDepositBlock),
        }
    }

    // ==================== View Methods ====================

    /// Total managed assets (idle plus strategy).
    pub fn balance(&self) -> U128 {
        U128(
            self.internal_total_managed_assets()
                .unwrap_or_else(|err| env::panic_str(&err.to_string())),
        )
    }

    pub fn get_owner(&self) -> AccountId {
        self.owner_id.clone()
    }

    pub fn get_keeper(&self) -> AccountId {
        self.keeper_id.clone()
    }

    pub fn get_fee_recipient(&self) -> AccountId {
        self.fee_recipient()
    }

    pub fn get_fee_schedule(&self) -> FeeSchedule {
        self.fees
    }

    pub fn get_deposit_limits(&self) -> DepositLimits {
        self.deposit_limits
    }

    pub fn is_emergency_shutdown(&self) -> bool {
        self.emergency_shutdown
    }

    /// Seconds timestamp of the last harvest.
    pub fn get_last_harvest(&self) -> U64 {
        U64(self.last_harvest_timestamp)
    }

    /// Block height of `account_id`'s most recent deposit.
    pub fn get_last_deposit_block(&self, account_id: AccountId) -> Option<U64> {
        self.last_deposit_block.get(&account_id).map(|height| U64(*height))
    }

    pub fn get_vault_info(&self) -> VaultInfoView {
        VaultInfoView {
            owner_id: self.owner_id.to_string(),
            keeper_id: self.keeper_id.to_string(),
            fee_recipient: self.fee_recipient().to_string(),
            asset: self.asset.to_string(),
            strategy_id: self.strategy.account_id.as_ref().map(|id| id.to_string()),
            emergency_shutdown: self.emergency_shutdown,
            performance_fee_bps: self.fees.performance_fee_bps,
            management_fee_bps: self.fees.management_fee_bps,
            max_performance_fee_bps: self.fees.max_performance_fee_bps,
            max_management_fee_bps: self.fees.max_management_fee_bps,
            deposit_min: self.deposit_limits.min.0.to_string(),
            deposit_max: self.deposit_limits.max.0.to_string(),
            idle_assets: self.idle_assets.to_string(),
            strategy_balance: self.strategy.principal.0.to_string(),
            total_shares: self.total_shares().to_string(),
            last_harvest_timestamp: self.last_harvest_timestamp,
        }
    }
}

impl Contract {
    /// Current block time in seconds.
    pub fn now_seconds() -> u64 {
        env::block_timestamp() / NANOS_PER_SECOND
    }

    /// Account that receives fee shares.
    pub fn fee_recipient(&self) -> AccountId {
        self.fee_recipient
            .clone()
            .unwrap_or_else(|| self.owner_id.clone())
    }
}
