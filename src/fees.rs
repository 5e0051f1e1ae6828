//! # Fee Engine
//!
//! Performance and management fees, charged only on harvest and paid as
//! newly minted shares.
//!
//! ## Formulas
//!
//! - performance: `gain * performance_fee_bps / 10_000`
//! - management: `total_assets * management_fee_bps * elapsed / (10_000 * SECONDS_PER_YEAR)`
//!
//! Both fees are converted to shares at the price after the gain is
//! realized and before anything is minted, so fee shares never pay fees on
//! themselves.

use near_sdk::{env, json_types::U128, near};

use crate::access::Action;
use crate::error::VaultError;
use crate::strategy::Strategy;
use crate::vault_standards::events::VaultHarvest;
use crate::vault_standards::mul_div::{mul_div, Rounding};
use crate::vault_standards::price_per_full_share;
use crate::{Contract, ContractExt};

/// Basis-point denominator.
pub const MAX_BPS: u16 = 10_000;

/// 365 days.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

pub const DEFAULT_PERFORMANCE_FEE_BPS: u16 = 1_000;
pub const DEFAULT_MANAGEMENT_FEE_BPS: u16 = 200;
pub const DEFAULT_MAX_PERFORMANCE_FEE_BPS: u16 = 3_000;
pub const DEFAULT_MAX_MANAGEMENT_FEE_BPS: u16 = 500;

/// Fee rates and their hard caps, all in basis points.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeeSchedule {
    pub performance_fee_bps: u16,
    pub management_fee_bps: u16,
    pub max_performance_fee_bps: u16,
    pub max_management_fee_bps: u16,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            performance_fee_bps: DEFAULT_PERFORMANCE_FEE_BPS,
            management_fee_bps: DEFAULT_MANAGEMENT_FEE_BPS,
            max_performance_fee_bps: DEFAULT_MAX_PERFORMANCE_FEE_BPS,
            max_management_fee_bps: DEFAULT_MAX_MANAGEMENT_FEE_BPS,
        }
    }
}

impl FeeSchedule {
    /// Checks caps against 100% and rates against caps.
    pub fn validate(&self) -> Result<(), VaultError> {
        for cap in [self.max_performance_fee_bps, self.max_management_fee_bps] {
            if cap > MAX_BPS {
                return Err(VaultError::InvalidFeeCap { cap });
            }
        }
        check_cap(self.performance_fee_bps, self.max_performance_fee_bps)?;
        check_cap(self.management_fee_bps, self.max_management_fee_bps)
    }

    pub fn set_performance_fee(&mut self, bps: u16) -> Result<(), VaultError> {
        check_cap(bps, self.max_performance_fee_bps)?;
        self.performance_fee_bps = bps;
        Ok(())
    }

    pub fn set_management_fee(&mut self, bps: u16) -> Result<(), VaultError> {
        check_cap(bps, self.max_management_fee_bps)?;
        self.management_fee_bps = bps;
        Ok(())
    }
}

fn check_cap(requested: u16, cap: u16) -> Result<(), VaultError> {
    if requested > cap {
        return Err(VaultError::FeeTooHigh { requested, cap });
    }
    Ok(())
}

/// `gain * bps / 10_000`, floored.
pub fn performance_fee(gain: u128, bps: u16) -> Result<u128, VaultError> {
    mul_div(gain, bps as u128, MAX_BPS as u128, Rounding::Down)
}

/// Pro-rata yearly fee on `total_assets` for `elapsed` seconds, floored.
pub fn management_fee(total_assets: u128, bps: u16, elapsed: u64) -> Result<u128, VaultError> {
    let rate = (bps as u128) * (elapsed as u128);
    let denominator = (MAX_BPS as u128) * (SECONDS_PER_YEAR as u128);
    mul_div(total_assets, rate, denominator, Rounding::Down)
}

/// What a harvest charges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeAssessment {
    pub gain: u128,
    pub performance_fee: u128,
    pub management_fee: u128,
    /// Shares to mint to the fee recipient.
    pub fee_shares: u128,
    /// Managed assets after realization.
    pub total_assets: u128,
}

/// Prices both fees against the vault after realization.
///
/// An empty vault (no shares or no assets) is charged nothing.
pub fn assess(
    schedule: &FeeSchedule,
    gain: u128,
    total_assets: u128,
    total_shares: u128,
    elapsed: u64,
) -> Result<FeeAssessment, VaultError> {
    if total_shares == 0 || total_assets == 0 {
        return Ok(FeeAssessment {
            gain,
            total_assets,
            ..Default::default()
        });
    }

    let performance_fee = performance_fee(gain, schedule.performance_fee_bps)?;
    let management_fee = management_fee(total_assets, schedule.management_fee_bps, elapsed)?;
    let fees = performance_fee
        .checked_add(management_fee)
        .ok_or(VaultError::ArithmeticOverflow)?;

    let fee_shares = mul_div(fees, total_shares, total_assets, Rounding::Down)?;
    total_shares
        .checked_add(fee_shares)
        .ok_or(VaultError::ArithmeticOverflow)?;

    Ok(FeeAssessment {
        gain,
        performance_fee,
        management_fee,
        fee_shares,
        total_assets,
    })
}

/// Realizes the strategy's gain and assesses fees on the result.
///
/// `strategy` is mutated only by its own `realize_gains`; callers hand in a
/// copy and keep it only on `Ok`.
pub fn harvest_with<S: Strategy>(
    strategy: &mut S,
    schedule: &FeeSchedule,
    idle_assets: u128,
    total_shares: u128,
    elapsed: u64,
) -> Result<FeeAssessment, VaultError> {
    let gain = strategy.realize_gains()?;
    let total_assets = idle_assets
        .checked_add(strategy.balance())
        .ok_or(VaultError::ArithmeticOverflow)?;

    assess(schedule, gain, total_assets, total_shares, elapsed)
}

/// Result of a harvest.
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq)]
pub struct HarvestReport {
    pub gain: U128,
    pub performance_fee: U128,
    pub management_fee: U128,
    pub fee_shares: U128,
    pub price_per_full_share: U128,
}

#[near]
impl Contract {
    /// Realizes strategy yield and mints fee shares.
    ///
    /// Keeper only. Zero gain is not an error; the harvest timestamp moves
    /// forward either way.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotKeeper`] for any other caller
    /// - [`VaultError::Strategy`] if the strategy fails to realize
    /// - [`VaultError::ArithmeticOverflow`] on overflow
    #[handle_result]
    pub fn harvest(&mut self) -> Result<HarvestReport, VaultError> {
        let keeper_id = self.authorize(Action::Harvest)?;
        let now = Self::now_seconds();
        let elapsed = now.saturating_sub(self.last_harvest_timestamp);

        let mut strategy = self.strategy.clone();
        let total_shares = self.total_shares();
        let assessment = harvest_with(
            &mut strategy,
            &self.fees,
            self.idle_assets,
            total_shares,
            elapsed,
        )?;

        let fee_recipient = self.fee_recipient();
        if assessment.fee_shares > 0 {
            self.internal_register_if_needed(&fee_recipient);
        }
        self.internal_mint(&fee_recipient, assessment.fee_shares, "Fee")?;
        self.strategy = strategy;
        self.last_harvest_timestamp = now;

        let price = price_per_full_share(assessment.total_assets, self.total_shares())?;

        VaultHarvest {
            keeper_id: &keeper_id,
            fee_recipient: &fee_recipient,
            gain: U128(assessment.gain),
            performance_fee: U128(assessment.performance_fee),
            management_fee: U128(assessment.management_fee),
            fee_shares: U128(assessment.fee_shares),
            elapsed,
        }
        .emit();

        env::log_str(&format!(
            "harvest gain={} fee_shares={} price={}",
            assessment.gain, assessment.fee_shares, price
        ));

        Ok(HarvestReport {
            gain: U128(assessment.gain),
            performance_fee: U128(assessment.performance_fee),
            management_fee: U128(assessment.management_fee),
            fee_shares: U128(assessment.fee_shares),
            price_per_full_share: U128(price),
        })
    }
}
