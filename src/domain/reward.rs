//! Token-unit conversion: the single place whole-token rewards become
//! on-chain base units (spec.md glossary: "token base units = whole tokens
//! × 10^18").

use ethers::types::U256;
use ethers::utils::parse_units;

/// Convert a whole-token `f64` reward into base units, rounded down.
///
/// Uses `ethers::utils::parse_units` (18 decimals) for the same
/// fixed-point conversion ethers applies to wei amounts, then floors any
/// fractional remainder introduced by `f64`'s binary representation by
/// truncating through the integer `U256` result.
pub fn to_base_units(reward: f64) -> anyhow::Result<U256> {
    if reward < 0.0 || !reward.is_finite() {
        anyhow::bail!("reward must be a finite, non-negative number of whole tokens");
    }
    // parse_units takes a decimal string; formatting at full f64 precision
    // and letting parse_units do the scaling avoids floating-point drift
    // for typical reward magnitudes.
    let formatted = format!("{reward:.18}");
    let units = parse_units(formatted, 18)?;
    Ok(units.into())
}
