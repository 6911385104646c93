//! ZRM amount conversion between human decimal strings and base units.

use alloy::primitives::U256;

use crate::error::{ChainError, ChainResult};

fn ten_pow(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Parse a non-negative decimal string ("12.5") into base units.
///
/// Rejects signs, exponents, empty input and more fractional digits than
/// `decimals` allows.
pub fn parse_amount(input: &str, decimals: u8) -> ChainResult<U256> {
    let invalid = || ChainError::InvalidAmount(input.to_string());
    let trimmed = input.trim();

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(ChainError::InvalidAmount(format!(
            "{input} has more than {decimals} decimal places"
        )));
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| invalid())?
    };
    let frac_units = if frac.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(frac, 10).map_err(|_| invalid())?
            * ten_pow(decimals - frac.len() as u8)
    };

    whole
        .checked_mul(ten_pow(decimals))
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(invalid)
}

/// Parse a base-unit integer string as stored in Postgres NUMERIC columns.
pub fn parse_base_units(input: &str) -> ChainResult<U256> {
    U256::from_str_radix(input.trim(), 10).map_err(|_| ChainError::InvalidAmount(input.to_string()))
}

/// Render base units as a decimal string without trailing zeros.
pub fn format_amount(value: U256, decimals: u8) -> String {
    let scale = ten_pow(decimals);
    let whole = value / scale;
    let frac = value % scale;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Convenience for stored base-unit strings; falls back to the raw input
/// when it is not a valid integer.
pub fn format_base_units(input: &str, decimals: u8) -> String {
    parse_base_units(input)
        .map(|v| format_amount(v, decimals))
        .unwrap_or_else(|_| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(parse_amount("1", 18).unwrap(), U256::from(10u64).pow(U256::from(18)));
        assert_eq!(parse_amount("12.5", 2).unwrap(), U256::from(1250));
        assert_eq!(parse_amount("0.001", 3).unwrap(), U256::from(1));
        assert_eq!(parse_amount(".5", 1).unwrap(), U256::from(5));
        assert_eq!(parse_amount("7.", 1).unwrap(), U256::from(70));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", ".", "-1", "+1", "1e18", "1.2.3", "abc", " "] {
            assert!(parse_amount(bad, 18).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(parse_amount("0.123", 2).is_err());
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_amount(U256::from(1250), 2), "12.5");
        assert_eq!(format_amount(U256::from(1200), 2), "12");
        assert_eq!(format_amount(U256::from(5), 3), "0.005");
        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn format_inverts_parse() {
        let value = parse_amount("250.75", 18).unwrap();
        assert_eq!(format_amount(value, 18), "250.75");
    }

    #[test]
    fn base_unit_strings() {
        assert_eq!(format_base_units("1500000000000000000", 18), "1.5");
        assert_eq!(format_base_units("garbage", 18), "garbage");
        assert!(parse_base_units("-3").is_err());
    }
}
