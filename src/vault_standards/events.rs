//! # Vault Events
//!
//! NEP-000 compliant event logging for vault operations.
//! Events are emitted as JSON logs prefixed with `EVENT_JSON:`.
//!
//! ## Event Types
//!
//! - `VaultDeposit`: Emitted when assets are deposited into the vault
//! - `VaultWithdraw`: Emitted when assets are withdrawn from the vault
//! - `VaultHarvest`: Emitted when the keeper harvests and fees are accrued
//! - `VaultConfigUpdate`: Emitted when the owner changes a policy setting
//!
//! ## Format
//!
//! Events follow the NEP-000 standard:
//! ```json
//! {
//!   "standard": "nep000",
//!   "version": "1.0.0",
//!   "event": "vault_deposit",
//!   "data": [{ ... }]
//! }
//! ```

use near_sdk::json_types::U128;
use near_sdk::serde::Serialize;
use near_sdk::{env, AccountIdRef};

// ============================================================================
// Event Wrapper
// ============================================================================

/// Top-level event wrapper for NEP-000 compliance.
#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "standard")]
#[must_use = "don't forget to `.emit()` this event"]
#[serde(rename_all = "snake_case")]
pub(crate) enum NearEvent<'a> {
    /// NEP-000 standard event container.
    Nep000(Nep000Event<'a>),
}

impl<'a> NearEvent<'a> {
    fn to_json_string(&self) -> String {
        #[allow(clippy::redundant_closure)]
        serde_json::to_string(self)
            .ok()
            .unwrap_or_else(|| env::abort())
    }

    fn to_json_event_string(&self) -> String {
        format!("EVENT_JSON:{}", self.to_json_string())
    }

    /// Logs the event to the NEAR runtime.
    pub(crate) fn emit(self) {
        near_sdk::env::log_str(&self.to_json_event_string());
    }
}

// ============================================================================
// Vault Deposit Event
// ============================================================================

/// Emitted when assets are deposited into the vault and shares are minted.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultDeposit<'a> {
    /// The account that sent the assets.
    pub sender_id: &'a AccountIdRef,
    /// The account that received the shares.
    pub owner_id: &'a AccountIdRef,
    /// The amount of assets deposited.
    pub assets: U128,
    /// The amount of shares minted.
    pub shares: U128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<&'a str>,
}

impl VaultDeposit<'_> {
    pub fn emit(self) {
        new_000_v1(Nep000EventKind::VaultDeposit(&[self])).emit()
    }
}

// ============================================================================
// Vault Withdraw Event
// ============================================================================

/// Emitted when shares are burned and assets are transferred out.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultWithdraw<'a> {
    /// The account that owned the shares.
    pub owner_id: &'a AccountIdRef,
    /// The amount of shares burned.
    pub shares: U128,
    /// The amount of assets transferred.
    pub assets: U128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<&'a str>,
}

impl VaultWithdraw<'_> {
    pub fn emit(self) {
        new_000_v1(Nep000EventKind::VaultWithdraw(&[self])).emit()
    }
}

// ============================================================================
// Vault Harvest Event
// ============================================================================

/// Emitted after a harvest, whether or not any fee was charged.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultHarvest<'a> {
    pub keeper_id: &'a AccountIdRef,
    pub fee_recipient: &'a AccountIdRef,
    /// Gain realized by the strategy.
    pub gain: U128,
    pub performance_fee: U128,
    pub management_fee: U128,
    /// Shares minted to the fee recipient.
    pub fee_shares: U128,
    /// Seconds since the previous harvest.
    pub elapsed: u64,
}

impl VaultHarvest<'_> {
    pub fn emit(self) {
        new_000_v1(Nep000EventKind::VaultHarvest(&[self])).emit()
    }
}

// ============================================================================
// Vault Config Update Event
// ============================================================================

/// Emitted when an owner-gated setting changes.
#[must_use]
#[derive(Serialize, Debug, Clone)]
#[serde(crate = "near_sdk::serde")]
pub struct VaultConfigUpdate<'a> {
    pub updated_by: &'a AccountIdRef,
    /// Name of the setting, e.g. `performance_fee_bps`.
    pub field: &'a str,
    pub value: String,
}

impl VaultConfigUpdate<'_> {
    pub fn emit(self) {
        new_000_v1(Nep000EventKind::VaultConfigUpdate(&[self])).emit()
    }
}

// ============================================================================
// Internal Event Structures
// ============================================================================

/// NEP-000 event payload structure.
#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
pub(crate) struct Nep000Event<'a> {
    /// Event format version.
    version: &'static str,
    /// The actual event data.
    #[serde(flatten)]
    event_kind: Nep000EventKind<'a>,
}

/// Enum of supported vault event types.
#[derive(Serialize, Debug)]
#[serde(crate = "near_sdk::serde")]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
#[allow(clippy::enum_variant_names)]
enum Nep000EventKind<'a> {
    VaultDeposit(&'a [VaultDeposit<'a>]),
    VaultWithdraw(&'a [VaultWithdraw<'a>]),
    VaultHarvest(&'a [VaultHarvest<'a>]),
    VaultConfigUpdate(&'a [VaultConfigUpdate<'a>]),
}

fn new_000<'a>(version: &'static str, event_kind: Nep000EventKind<'a>) -> NearEvent<'a> {
    NearEvent::Nep000(Nep000Event {
        version,
        event_kind,
    })
}

fn new_000_v1(event_kind: Nep000EventKind) -> NearEvent {
    new_000("1.0.0", event_kind)
}
