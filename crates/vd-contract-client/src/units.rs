//! Token amounts. The voting token uses 18 decimals, like ether.

use alloy_primitives::U256;
use alloy_primitives::utils::{format_ether, parse_ether};

use crate::{ContractError, ContractResult};

/// Parse a user-entered whole-token amount (`"5"`, `"0.25"`) into base units.
/// Zero, negative and non-decimal input is rejected.
pub fn parse_token_amount(input: &str) -> ContractResult<U256> {
    let trimmed = input.trim();
    let invalid = || ContractError::InvalidInput(format!("'{trimmed}' is not a positive token amount"));
    // parse_ether drops the sign of negative amounts.
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(invalid());
    }
    let amount = parse_ether(trimmed).map_err(|_| invalid())?;
    if amount.is_zero() {
        return Err(invalid());
    }
    Ok(amount)
}

/// Base units back to whole tokens without trailing zeros: `12.5`, `0`, `7`.
pub fn format_token_amount(amount: U256) -> String {
    let formatted = format_ether(amount);
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_amounts_parse() {
        let one = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(parse_token_amount(" 5 ").unwrap(), one * U256::from(5u64));
        assert_eq!(parse_token_amount("0.5").unwrap(), one / U256::from(2u64));
    }

    #[test]
    fn non_positive_or_odd_amounts_are_rejected() {
        for input in ["", "0", "0.0", "-2", "1e3", "abc", "1,5"] {
            assert!(
                matches!(parse_token_amount(input), Err(ContractError::InvalidInput(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn formatting_trims_trailing_zeros() {
        assert_eq!(format_token_amount(U256::ZERO), "0");
        assert_eq!(format_token_amount(parse_token_amount("3.14").unwrap()), "3.14");
        assert_eq!(format_token_amount(parse_token_amount("7").unwrap()), "7");
    }
}
