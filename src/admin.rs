//! Owner policy methods.
//!
//! Each setter authorizes the caller, applies the change, and emits a
//! `vault_config_update` event naming the field and its new value.

use near_sdk::{json_types::U128, near, AccountId, PromiseOrValue};

use crate::access::Action;
use crate::error::VaultError;
use crate::policy::DepositLimits;
use crate::vault_standards::events::VaultConfigUpdate;
use crate::{Contract, ContractExt};

impl Contract {
    fn emit_config_update(updated_by: &AccountId, field: &str, value: String) {
        VaultConfigUpdate {
            updated_by,
            field,
            value,
        }
        .emit();
    }
}

#[near]
impl Contract {
    /// Sets the performance fee, in basis points of realized gain.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotOwner`] for any other caller
    /// - [`VaultError::FeeTooHigh`] above the performance fee cap
    #[handle_result]
    pub fn set_performance_fee(&mut self, fee_bps: u16) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetPerformanceFee)?;
        self.fees.set_performance_fee(fee_bps)?;
        Self::emit_config_update(&caller, "performance_fee_bps", fee_bps.to_string());
        Ok(())
    }

    /// Sets the yearly management fee, in basis points of managed assets.
    ///
    /// Takes effect from the next harvest, which charges the whole interval
    /// since the previous one at the new rate.
    #[handle_result]
    pub fn set_management_fee(&mut self, fee_bps: u16) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetManagementFee)?;
        self.fees.set_management_fee(fee_bps)?;
        Self::emit_config_update(&caller, "management_fee_bps", fee_bps.to_string());
        Ok(())
    }

    /// Turns emergency shutdown on or off. Withdrawals stay open either way.
    ///
    /// Turning it on also recalls everything the strategy holds, so that
    /// holders can withdraw once the strategy has divested.
    ///
    /// # Returns
    ///
    /// The recall's outcome, or `false` when there was nothing to recall.
    #[handle_result]
    pub fn set_emergency_shutdown(
        &mut self,
        active: bool,
    ) -> Result<PromiseOrValue<bool>, VaultError> {
        let caller = self.authorize(Action::SetEmergencyShutdown)?;
        self.emergency_shutdown = active;
        Self::emit_config_update(&caller, "emergency_shutdown", active.to_string());

        if active && self.strategy.account_id.is_some() {
            return self.internal_recall(self.strategy.holdings());
        }
        Ok(PromiseOrValue::Value(false))
    }

    /// Replaces the deposit bounds. Zero disables a bound.
    ///
    /// Lowering `max` below the current total is allowed; it only blocks
    /// further deposits.
    #[handle_result]
    pub fn set_deposit_limits(&mut self, min: U128, max: U128) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetDepositLimits)?;
        let limits = DepositLimits { min, max };
        limits.validate()?;
        self.deposit_limits = limits;
        Self::emit_config_update(&caller, "deposit_limits", format!("{}:{}", min.0, max.0));
        Ok(())
    }

    #[handle_result]
    pub fn set_keeper(&mut self, keeper_id: AccountId) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetKeeper)?;
        Self::emit_config_update(&caller, "keeper_id", keeper_id.to_string());
        self.keeper_id = keeper_id;
        Ok(())
    }

    /// Sets the fee share receiver. `None` sends fees to the owner.
    #[handle_result]
    pub fn set_fee_recipient(&mut self, fee_recipient: Option<AccountId>) -> Result<(), VaultError> {
        let caller = self.authorize(Action::SetFeeRecipient)?;
        self.fee_recipient = fee_recipient;
        Self::emit_config_update(&caller, "fee_recipient", self.fee_recipient().to_string());
        Ok(())
    }

    /// Hands the owner role to `new_owner_id`.
    #[handle_result]
    pub fn transfer_ownership(&mut self, new_owner_id: AccountId) -> Result<(), VaultError> {
        let caller = self.authorize(Action::TransferOwnership)?;
        Self::emit_config_update(&caller, "owner_id", new_owner_id.to_string());
        self.owner_id = new_owner_id;
        Ok(())
    }
}
