//! # Initialization Tests
//!
//! Defaults applied by `init` and rejection of invalid configuration.

mod helpers;

use helpers::*;
use near_contract_standards::fungible_token::metadata::FungibleTokenMetadataProvider;
use near_sdk::json_types::U128;
use yield_vault::fees::FeeSchedule;
use yield_vault::policy::DepositLimits;
use yield_vault::vault_standards::VaultCore;
use yield_vault::Contract;

#[test]
fn defaults() {
    ctx(VAULT, 0, 10, 1_700_000_000);
    let vault = Contract::init(account(OWNER), account(ASSET), metadata(), None, None, None);

    assert_eq!(vault.get_fee_schedule(), FeeSchedule::default());
    assert_eq!(vault.get_deposit_limits(), DepositLimits::unlimited());
    assert_eq!(vault.get_fee_recipient().as_str(), OWNER);
    assert_eq!(vault.get_last_harvest().0, 1_700_000_000);
    assert_eq!(vault.asset().as_str(), ASSET);
    assert_eq!(vault.ft_metadata().symbol, "yvUSDC");
    assert_eq!(vault.balance().0, 0);
    assert_eq!(vault.get_price_per_full_share().0, ONE);
    assert!(vault.get_strategy().account_id.is_none());
}

#[test]
fn empty_vault_previews() {
    let vault = new_vault();
    assert_eq!(vault.convert_to_shares(U128(1_000)).0, 1_000);
    assert_eq!(vault.convert_to_assets(U128(1_000)).0, 0);
    assert_eq!(vault.preview_withdraw(U128(1_000)).0, 0);
}

#[test]
fn custom_configuration() {
    let fees = FeeSchedule {
        performance_fee_bps: 2_000,
        management_fee_bps: 0,
        max_performance_fee_bps: 2_500,
        max_management_fee_bps: 100,
    };
    let limits = DepositLimits {
        min: U128(100),
        max: U128(1_000_000),
    };
    let vault = new_vault_with(Some(fees), Some(limits));

    let info = vault.get_vault_info();
    assert_eq!(info.performance_fee_bps, 2_000);
    assert_eq!(info.max_performance_fee_bps, 2_500);
    assert_eq!(info.deposit_min, "100");
    assert_eq!(info.deposit_max, "1000000");
    assert_eq!(info.keeper_id, KEEPER);
}

#[test]
#[should_panic(expected = "fee too high: 4000 bps (cap 3000 bps)")]
fn rate_above_cap_is_rejected() {
    let fees = FeeSchedule {
        performance_fee_bps: 4_000,
        ..Default::default()
    };
    new_vault_with(Some(fees), None);
}

#[test]
#[should_panic(expected = "invalid fee cap: 12000 bps")]
fn cap_above_full_is_rejected() {
    let fees = FeeSchedule {
        max_management_fee_bps: 12_000,
        ..Default::default()
    };
    new_vault_with(Some(fees), None);
}

#[test]
#[should_panic(expected = "invalid deposit limits")]
fn unordered_limits_are_rejected() {
    let limits = DepositLimits {
        min: U128(10),
        max: U128(5),
    };
    new_vault_with(None, Some(limits));
}
