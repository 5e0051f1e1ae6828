//! # Access Control
//!
//! Every privileged operation names an [`Action`]; the table in
//! [`Action::role`] maps it to the single [`Role`] allowed to perform it.
//! Entry points call [`Contract::authorize`] once, before touching state.
//!
//! Roles are not hierarchical: the owner cannot harvest unless it is also
//! the keeper.

use near_sdk::{env, AccountId};

use crate::error::VaultError;
use crate::Contract;

/// An authority role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Policy authority.
    Owner,
    /// Harvest authority.
    Keeper,
    /// The configured strategy account.
    Strategy,
}

impl Role {
    /// The error returned when a caller lacks this role.
    pub fn denied(self) -> VaultError {
        match self {
            Role::Owner => VaultError::NotOwner,
            Role::Keeper => VaultError::NotKeeper,
            Role::Strategy => VaultError::NotStrategy,
        }
    }
}

/// A privileged operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Harvest,
    Earn,
    Recall,
    ReportStrategy,
    SetPerformanceFee,
    SetManagementFee,
    SetEmergencyShutdown,
    SetDepositLimits,
    SetKeeper,
    SetStrategy,
    SetFeeRecipient,
    TransferOwnership,
}

impl Action {
    /// The authorization table.
    pub const fn role(self) -> Role {
        match self {
            Action::Harvest | Action::Earn | Action::Recall => Role::Keeper,
            Action::ReportStrategy => Role::Strategy,
            Action::SetPerformanceFee
            | Action::SetManagementFee
            | Action::SetEmergencyShutdown
            | Action::SetDepositLimits
            | Action::SetKeeper
            | Action::SetStrategy
            | Action::SetFeeRecipient
            | Action::TransferOwnership => Role::Owner,
        }
    }
}

impl Contract {
    /// Current holder of `role`, if any.
    pub fn role_holder(&self, role: Role) -> Option<&AccountId> {
        match role {
            Role::Owner => Some(&self.owner_id),
            Role::Keeper => Some(&self.keeper_id),
            Role::Strategy => self.strategy.account_id.as_ref(),
        }
    }

    /// Checks the predecessor against the role `action` requires.
    ///
    /// # Returns
    ///
    /// The authorized caller.
    pub fn authorize(&self, action: Action) -> Result<AccountId, VaultError> {
        let caller = env::predecessor_account_id();
        let role = action.role();

        match self.role_holder(role) {
            Some(holder) if *holder == caller => Ok(caller),
            _ => Err(role.denied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeper_actions() {
        assert_eq!(Action::Harvest.role(), Role::Keeper);
        assert_eq!(Action::Earn.role(), Role::Keeper);
        assert_eq!(Action::Recall.role(), Role::Keeper);
    }

    #[test]
    fn policy_actions_belong_to_owner() {
        for action in [
            Action::SetPerformanceFee,
            Action::SetManagementFee,
            Action::SetEmergencyShutdown,
            Action::SetDepositLimits,
            Action::SetKeeper,
            Action::SetStrategy,
            Action::SetFeeRecipient,
            Action::TransferOwnership,
        ] {
            assert_eq!(action.role(), Role::Owner, "{:?}", action);
        }
    }

    #[test]
    fn denial_errors_name_the_role() {
        assert_eq!(Role::Owner.denied(), VaultError::NotOwner);
        assert_eq!(Role::Keeper.denied(), VaultError::NotKeeper);
        assert_eq!(Role::Strategy.denied(), VaultError::NotStrategy);
    }
}
