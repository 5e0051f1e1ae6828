//! # Test Utilities
//!
//! Provides helper functions and builders for unit testing the contract.
//! These utilities simplify test setup by handling NEAR SDK context
//! initialization and contract configuration.
//!
//! ## Modules
//!
//! - [`helpers`]: Low-level context control and deposit shortcuts
//! - [`builders`]: Builder pattern for flexible contract configuration

/// Helper functions for test context and contract initialization.
#[cfg(test)]
pub mod helpers {
    use crate::vault::DepositMessage;
    use crate::Contract;
    use near_contract_standards::fungible_token::metadata::FungibleTokenMetadata;
    use near_sdk::json_types::U128;
    use near_sdk::test_utils::VMContextBuilder;
    use near_sdk::{testing_env, NearToken, PromiseResult, RuntimeFeesConfig};

    /// Account the vault runs as in unit tests.
    pub const VAULT: &str = "vault.test";

    /// Sets the caller and attached deposit at block 0, time 0.
    ///
    /// # Example
    ///
    /// ```ignore
    /// init_ctx("alice.test", 1); // Alice calls with 1 yoctoNEAR
    /// contract.withdraw(U128(10));
    /// ```
    pub fn init_ctx(predecessor: &str, deposit_yocto: u128) {
        ctx_at(predecessor, deposit_yocto, 0, 0);
    }

    /// Sets the caller, attached deposit, block height and block time (seconds).
    ///
    /// Contract storage carries over between calls.
    pub fn ctx_at(predecessor: &str, deposit_yocto: u128, block_height: u64, timestamp_secs: u64) {
        let mut builder = VMContextBuilder::new();
        builder
            .current_account_id(VAULT.parse().unwrap())
            .predecessor_account_id(predecessor.parse().unwrap())
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
            .current_account_id(VAULT.parse().unwrap())
            .predecessor_account_id(VAULT.parse().unwrap());
        testing_env!(
            builder.build(),
            near_sdk::test_vm_config(),
            RuntimeFeesConfig::test(),
            Default::default(),
            vec![result]
        );
    }

    pub fn share_metadata() -> FungibleTokenMetadata {
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

    /// Registers `holder` on the share token, as `storage_deposit` would.
    pub fn register(contract: &mut Contract, holder: &str) {
        contract
            .token
            .internal_register_account(&holder.parse().unwrap());
    }

    /// Registers `sender` and deposits `amount` for it through the asset's
    /// receiver hook path.
    pub fn deposit(contract: &mut Contract, sender: &str, amount: u128) -> u128 {
        if !contract.token.accounts.contains_key(&sender.parse().unwrap()) {
            register(contract, sender);
        }
        contract
            .handle_deposit(sender.parse().unwrap(), U128(amount), DepositMessage::default())
            .unwrap()
            .0
    }
}

/// Builder pattern for flexible contract configuration in tests.
#[cfg(test)]
pub mod builders {
    use crate::fees::FeeSchedule;
    use crate::policy::DepositLimits;
    use crate::test_utils::helpers::{init_ctx, share_metadata};
    use crate::Contract;

    /// Builder for creating test `Contract` instances with custom configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let contract = ContractBuilder::new("owner.test", "usdc.test")
    ///     .keeper("keeper.test")
    ///     .idle_assets(1_000)
    ///     .supply(1_000)
    ///     .predecessor("keeper.test")
    ///     .build();
    /// ```
    pub struct ContractBuilder {
        owner: String,
        asset: String,
        keeper: Option<String>,
        fees: Option<FeeSchedule>,
        deposit_limits: Option<DepositLimits>,
        idle_assets: u128,
        supply: u128,
        predecessor: Option<String>,
        attached: u128,
    }

    impl ContractBuilder {
        /// Creates a new builder with required owner and asset accounts.
        pub fn new(owner: &str, asset: &str) -> Self {
            Self {
                owner: owner.to_string(),
                asset: asset.to_string(),
                keeper: None,
                fees: None,
                deposit_limits: None,
                idle_assets: 0,
                supply: 0,
                predecessor: Some(owner.to_string()),
                attached: 0,
            }
        }

        pub fn keeper(mut self, id: &str) -> Self {
            self.keeper = Some(id.to_string());
            self
        }

        pub fn fees(mut self, fees: FeeSchedule) -> Self {
            self.fees = Some(fees);
            self
        }

        pub fn deposit_limits(mut self, limits: DepositLimits) -> Self {
            self.deposit_limits = Some(limits);
            self
        }

        /// Sets the initial idle assets in the vault.
        pub fn idle_assets(mut self, n: u128) -> Self {
            self.idle_assets = n;
            self
        }

        /// Sets the initial share supply, held by the owner.
        pub fn supply(mut self, n: u128) -> Self {
            self.supply = n;
            self
        }

        /// Sets the predecessor (caller) account for subsequent calls.
        pub fn predecessor(mut self, id: &str) -> Self {
            self.predecessor = Some(id.to_string());
            self
        }

        /// Sets the attached deposit in yoctoNEAR.
        pub fn attached(mut self, yocto: u128) -> Self {
            self.attached = yocto;
            self
        }

        /// Builds and returns the configured `Contract` instance.
        pub fn build(self) -> Contract {
            init_ctx(&self.owner, 0);
            let mut c = Contract::init(
                self.owner.parse().unwrap(),
                self.asset.parse().unwrap(),
                share_metadata(),
                self.keeper.map(|k| k.parse().unwrap()),
                self.fees,
                self.deposit_limits,
            );
            if self.supply > 0 {
                c.internal_register_if_needed(&self.owner.parse().unwrap());
                c.internal_mint(&self.owner.parse().unwrap(), self.supply, "Seed")
                    .unwrap();
            }
            c.idle_assets = self.idle_assets;
            if let Some(p) = &self.predecessor {
                init_ctx(p, self.attached);
            }
            c
        }
    }
}
