//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use std::sync::LazyLock;

use regex::Regex;
use validator::Validate;

use crate::error::ZoriumError;

static ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"));
static TX_HASH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("static regex"));
pub static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("static regex"));

/// Validate a request body, returning a ZoriumError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), ZoriumError> {
    body.validate().map_err(|e| ZoriumError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// Validate an EVM address and return it lowercased.
pub fn validate_address(address: &str) -> Result<String, ZoriumError> {
    let trimmed = address.trim();
    if !ADDRESS_REGEX.is_match(trimmed) {
        return Err(ZoriumError::validation(format!(
            "Invalid wallet address: {trimmed}"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Validate a transaction hash and return it lowercased.
pub fn validate_tx_hash(hash: &str) -> Result<String, ZoriumError> {
    let trimmed = hash.trim();
    if !TX_HASH_REGEX.is_match(trimmed) {
        return Err(ZoriumError::validation(format!(
            "Invalid transaction hash: {trimmed}"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Validate that a display string (NFT or collection name) is usable.
pub fn validate_name(name: &str) -> Result<(), ZoriumError> {
    if name.trim().is_empty() {
        return Err(ZoriumError::validation(
            "Name cannot be empty or whitespace only",
        ));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(ZoriumError::validation(
            "Name cannot contain control characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Too short"))]
        name: String,
        #[validate(range(min = 1, message = "Must be positive"))]
        count: i32,
    }

    #[test]
    fn address_is_lowercased() {
        let addr = validate_address(" 0xAbCdEf0123456789aBcDeF0123456789AbCdEf01 ").unwrap();
        assert_eq!(addr, "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_address("0x123").is_err());
        assert!(validate_address("abcdef0123456789abcdef0123456789abcdef0123").is_err());
        assert!(validate_address("0xZZcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn tx_hash_requires_32_bytes() {
        let hash = format!("0x{}", "AB".repeat(32));
        assert_eq!(validate_tx_hash(&hash).unwrap(), format!("0x{}", "ab".repeat(32)));
        assert!(validate_tx_hash("0xabc").is_err());
    }

    #[test]
    fn names_must_have_content() {
        assert!(validate_name("Genesis Drop #1").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn joins_validation_messages() {
        let sample = Sample {
            name: "ab".into(),
            count: 0,
        };
        let err = validate_request(&sample).unwrap_err();
        match err {
            ZoriumError::Validation { message } => {
                assert_eq!(message, "Must be positive; Too short");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn usernames_allow_dots_and_dashes() {
        assert!(USERNAME_REGEX.is_match("satoshi.n-42"));
        assert!(!USERNAME_REGEX.is_match("bad name"));
    }
}
