use crate::error::VaultError;
use crate::policy::{check_deposit, check_withdraw};
use crate::vault_standards::events::{VaultDeposit, VaultWithdraw};
use crate::vault_standards::{shares_for_deposit, VaultCore};
use crate::{Contract, ContractExt};
use near_contract_standards::fungible_token::metadata::{
    FungibleTokenMetadata, FungibleTokenMetadataProvider,
};
use near_contract_standards::fungible_token::{
    core::FungibleTokenCore, receiver::FungibleTokenReceiver, FungibleTokenResolver,
};
use near_contract_standards::storage_management::StorageManagement;
use near_sdk::serde::Deserialize;
use near_sdk::{
    assert_one_yocto, env, json_types::U128, near, AccountId, NearToken, PromiseOrValue,
    PromiseResult,
};

#[derive(Deserialize, Debug, PartialEq)]
#[serde(crate = "near_sdk::serde")]
#[serde(rename_all = "snake_case")]
pub enum FtTransferAction {
    Deposit(DepositMessage),
    /// Assets returned by the strategy account.
    Divest,
}

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct DepositMessage {
    pub min_shares: Option<U128>,
    pub receiver_id: Option<AccountId>,
    pub memo: Option<String>,
    pub donate: Option<bool>,
}

impl FtTransferAction {
    /// Parses an `ft_transfer_call` message.
    ///
    /// An empty message is a plain deposit; a bare [`DepositMessage`] is
    /// accepted as well as the tagged form.
    pub fn parse(msg: &str) -> Option<Self> {
        if msg.trim().is_empty() {
            return Some(FtTransferAction::Deposit(DepositMessage::default()));
        }
        serde_json::from_str::<FtTransferAction>(msg)
            .or_else(|_| serde_json::from_str::<DepositMessage>(msg).map(FtTransferAction::Deposit))
            .ok()
    }
}

fn unwrap_view(value: Result<u128, VaultError>) -> U128 {
    U128(value.unwrap_or_else(|err| env::panic_str(&err.to_string())))
}

impl Contract {
    /// Credits a deposit of `amount` sent by `sender_id`.
    ///
    /// The share receiver must already be registered with `storage_deposit`.
    ///
    /// # Returns
    ///
    /// Shares minted (zero for a donation).
    pub fn handle_deposit(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        parsed_msg: DepositMessage,
    ) -> Result<U128, VaultError> {
        if parsed_msg.donate.unwrap_or(false) {
            return self.handle_donation(sender_id, amount.0).map(|_| U128(0));
        }

        let total_assets = self.internal_total_managed_assets()?;
        check_deposit(
            self.emergency_shutdown,
            &self.deposit_limits,
            total_assets,
            amount.0,
        )?;

        let shares = shares_for_deposit(amount.0, self.total_shares(), total_assets)?;
        if shares == 0 {
            return Err(VaultError::AmountTooSmall {
                amount: amount.0,
                min: self.deposit_limits.min.0.max(1),
            });
        }
        if let Some(min_shares) = parsed_msg.min_shares {
            if shares < min_shares.0 {
                return Err(VaultError::SlippageExceeded {
                    shares,
                    min_shares: min_shares.0,
                });
            }
        }
        let owner_id = parsed_msg.receiver_id.unwrap_or_else(|| sender_id.clone());
        if !self.token.accounts.contains_key(&owner_id) {
            return Err(VaultError::AccountNotRegistered { account_id: owner_id });
        }
        let idle = self
            .idle_assets
            .checked_add(amount.0)
            .ok_or(VaultError::ArithmeticOverflow)?;

        self.internal_mint(&owner_id, shares, "Deposit")?;
        self.idle_assets = idle;
        self.last_deposit_block
            .insert(owner_id.clone(), env::block_height());

        VaultDeposit {
            sender_id: &sender_id,
            owner_id: &owner_id,
            assets: amount,
            shares: U128(shares),
            memo: parsed_msg.memo.as_deref(),
        }
        .emit();

        Ok(U128(shares))
    }

    /// Adds `amount` to idle assets without minting, raising the share price.
    fn handle_donation(&mut self, sender_id: AccountId, amount: u128) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::AmountTooSmall { amount, min: 1 });
        }
        self.idle_assets = self
            .idle_assets
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;

        VaultDeposit {
            sender_id: &sender_id,
            owner_id: &sender_id,
            assets: U128(amount),
            shares: U128(0),
            memo: Some("Donation"),
        }
        .emit();
        Ok(())
    }

    /// Copies `sender_id`'s deposit block to `receiver_id` when it is the
    /// current block, so moved shares stay locked for the rest of it.
    fn internal_carry_deposit_marker(&mut self, sender_id: &AccountId, receiver_id: &AccountId) {
        let height = env::block_height();
        if self.last_deposit_block.get(sender_id) == Some(&height) {
            self.last_deposit_block.insert(receiver_id.clone(), height);
        }
    }
}

#[near]
impl Contract {
    /// Burns `shares` and sends the caller their assets.
    ///
    /// Requires exactly 1 yoctoNEAR. Allowed during emergency shutdown.
    ///
    /// # Returns
    ///
    /// The assets transferred, resolved by `resolve_withdraw`, which restores
    /// the shares and returns zero if the transfer fails.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InsufficientShares`] if the caller owns fewer shares
    /// - [`VaultError::SameBlockWithdrawal`] in the block of the caller's last deposit
    /// - [`VaultError::NothingToWithdraw`] if the shares are worth nothing
    /// - [`VaultError::InsufficientLiquidity`] if the assets are deployed
    #[payable]
    #[handle_result]
    pub fn withdraw(&mut self, shares: U128) -> Result<PromiseOrValue<U128>, VaultError> {
        assert_one_yocto();

        let owner = env::predecessor_account_id();
        check_withdraw(
            shares.0,
            self.shares_of(&owner),
            self.last_deposit_block.get(&owner).copied(),
            env::block_height(),
        )?;

        let assets = self.internal_convert_to_assets(shares.0)?;
        let promise = self.internal_execute_withdrawal(owner, shares.0, assets)?;

        Ok(PromiseOrValue::Promise(promise))
    }

    #[private]
    pub fn resolve_withdraw(&mut self, owner: AccountId, shares: U128, assets: U128) -> U128 {
        match env::promise_result(0) {
            PromiseResult::Successful(_) => {
                VaultWithdraw {
                    owner_id: &owner,
                    shares,
                    assets,
                    memo: None,
                }
                .emit();

                assets
            }
            _ => {
                // Transfer failed - re-mint the burnt shares and restore idle assets
                if let Err(err) = self.internal_rollback_withdrawal(&owner, shares.0, assets.0) {
                    env::panic_str(&err.to_string());
                }
                U128(0)
            }
        }
    }
}

// ===== Implement VaultCore Trait =====
#[near]
impl VaultCore for Contract {
    fn asset(&self) -> AccountId {
        self.asset.clone()
    }

    fn total_assets(&self) -> U128 {
        unwrap_view(self.internal_total_managed_assets())
    }

    fn convert_to_shares(&self, assets: U128) -> U128 {
        unwrap_view(self.internal_convert_to_shares_deposit(assets.0))
    }

    fn convert_to_assets(&self, shares: U128) -> U128 {
        unwrap_view(self.internal_convert_to_assets(shares.0))
    }

    fn preview_withdraw(&self, assets: U128) -> U128 {
        unwrap_view(self.internal_convert_to_shares_withdraw(assets.0))
    }

    fn get_price_per_full_share(&self) -> U128 {
        unwrap_view(self.internal_price_per_full_share())
    }
}

#[near]
impl FungibleTokenReceiver for Contract {
    fn ft_on_transfer(
        &mut self,
        sender_id: AccountId,
        amount: U128,
        msg: String,
    ) -> PromiseOrValue<U128> {
        assert_eq!(
            env::predecessor_account_id(),
            self.asset.clone(),
            "Only the underlying asset can call ft_on_transfer"
        );

        let action = FtTransferAction::parse(&msg)
            .unwrap_or_else(|| env::panic_str("Invalid ft_on_transfer message"));

        let result = match action {
            FtTransferAction::Deposit(deposit) => {
                self.handle_deposit(sender_id, amount, deposit).map(|_| ())
            }
            FtTransferAction::Divest => self.handle_divest(&sender_id, amount.0),
        };

        // Panicking makes the asset token refund the whole transfer
        if let Err(err) = result {
            env::panic_str(&err.to_string());
        }
        PromiseOrValue::Value(U128(0))
    }
}

// ===== Implement Fungible Token Traits for Vault Shares =====
#[near]
impl FungibleTokenCore for Contract {
    #[payable]
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>) {
        let sender_id = env::predecessor_account_id();
        self.token.ft_transfer(receiver_id.clone(), amount, memo);
        self.internal_carry_deposit_marker(&sender_id, &receiver_id);
    }

    #[payable]
    fn ft_transfer_call(
        &mut self,
        receiver_id: AccountId,
        amount: U128,
        memo: Option<String>,
        msg: String,
    ) -> PromiseOrValue<U128> {
        let sender_id = env::predecessor_account_id();
        self.internal_carry_deposit_marker(&sender_id, &receiver_id);
        self.token.ft_transfer_call(receiver_id, amount, memo, msg)
    }

    fn ft_total_supply(&self) -> U128 {
        self.token.ft_total_supply()
    }

    fn ft_balance_of(&self, account_id: AccountId) -> U128 {
        self.token.ft_balance_of(account_id)
    }
}

#[near]
impl FungibleTokenResolver for Contract {
    #[private]
    fn ft_resolve_transfer(
        &mut self,
        sender_id: AccountId,
        receiver_id: AccountId,
        amount: U128,
    ) -> U128 {
        self.token
            .ft_resolve_transfer(sender_id, receiver_id, amount)
    }
}

#[near]
impl StorageManagement for Contract {
    #[payable]
    fn storage_deposit(
        &mut self,
        account_id: Option<AccountId>,
        registration_only: Option<bool>,
    ) -> near_contract_standards::storage_management::StorageBalance {
        self.token.storage_deposit(account_id, registration_only)
    }

    #[payable]
    fn storage_withdraw(
        &mut self,
        amount: Option<NearToken>,
    ) -> near_contract_standards::storage_management::StorageBalance {
        self.token.storage_withdraw(amount)
    }

    fn storage_balance_bounds(
        &self,
    ) -> near_contract_standards::storage_management::StorageBalanceBounds {
        self.token.storage_balance_bounds()
    }

    fn storage_balance_of(
        &self,
        account_id: AccountId,
    ) -> Option<near_contract_standards::storage_management::StorageBalance> {
        self.token.storage_balance_of(account_id)
    }

    #[payable]
    fn storage_unregister(&mut self, force: Option<bool>) -> bool {
        self.token.storage_unregister(force)
    }
}

#[near]
impl FungibleTokenMetadataProvider for Contract {
    fn ft_metadata(&self) -> FungibleTokenMetadata {
        self.metadata.clone()
    }
}
