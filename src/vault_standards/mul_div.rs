//! # Safe Multiplication and Division
//!
//! Provides overflow-safe multiplication and division operations using
//! 256-bit intermediate arithmetic. This is essential for share/asset
//! conversions where naive multiplication could overflow.
//!
//! ## Rounding Modes
//!
//! - `Down`: Round towards zero (floor)
//! - `Up`: Round away from zero (ceiling)
//!
//! The rounding mode affects financial calculations:
//! - Use `Down` when calculating shares to mint or assets to pay out (favor vault)
//! - Use `Up` when calculating shares a holder must burn (favor vault)

use super::core::U256;
use crate::error::VaultError;

/// Rounding direction for division operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Round towards zero (floor division).
    Down,
    /// Round away from zero (ceiling division).
    Up,
}

/// Performs `(x * y) / denominator` with configurable rounding.
///
/// The product is formed in 256 bits, so it never overflows; only the
/// narrowing of the quotient back to `u128` can fail.
///
/// # Errors
///
/// [`VaultError::ArithmeticOverflow`] if `denominator` is zero or the
/// result does not fit in a `u128`.
///
/// # Example
///
/// ```ignore
/// // shares = (assets * supply) / total_assets, rounded down
/// let shares = mul_div(100_000, 1_000_000, 500_000, Rounding::Down)?;
/// assert_eq!(shares, 200_000);
/// ```
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::ArithmeticOverflow);
    }

    let numerator = U256::from(x) * U256::from(y);
    let denominator = U256::from(denominator);
    let mut result = numerator / denominator;

    if rounding == Rounding::Up && !(numerator % denominator).is_zero() {
        result = result
            .checked_add(U256::one())
            .ok_or(VaultError::ArithmeticOverflow)?;
    }

    if result > U256::from(u128::MAX) {
        return Err(VaultError::ArithmeticOverflow);
    }

    Ok(result.as_u128())
}
