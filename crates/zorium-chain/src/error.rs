//! Chain-layer errors and their mapping onto API errors.

use zorium_common::error::ZoriumError;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("No pending sign-in nonce for this address")]
    NonceMissing,

    #[error("Sign-in nonce expired")]
    NonceExpired,

    #[error("Transaction {0} not found or not yet mined")]
    ReceiptNotFound(String),

    #[error("Transaction {0} reverted")]
    TransactionFailed(String),

    #[error("No matching ZRM transfer in transaction {0}")]
    TransferNotFound(String),

    #[error("Transfer amount mismatch: expected {expected}, found {actual}")]
    AmountMismatch { expected: String, actual: String },
}

pub type ChainResult<T> = Result<T, ChainError>;

impl From<ChainError> for ZoriumError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rpc(message) | ChainError::Contract(message) => {
                ZoriumError::Chain { message }
            }
            ChainError::InvalidSignature | ChainError::NonceMissing | ChainError::NonceExpired => {
                ZoriumError::InvalidCredentials
            }
            ChainError::NotConfigured(key) => {
                ZoriumError::Internal(anyhow::anyhow!("{key} is not configured"))
            }
            other @ (ChainError::InvalidAddress(_)
            | ChainError::InvalidAmount(_)
            | ChainError::ReceiptNotFound(_)
            | ChainError::TransactionFailed(_)
            | ChainError::TransferNotFound(_)
            | ChainError::AmountMismatch { .. }) => ZoriumError::Validation {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failures_are_unauthorized() {
        let err: ZoriumError = ChainError::NonceExpired.into();
        assert_eq!(err.status_code().as_u16(), 401);
    }

    #[test]
    fn rpc_failures_are_bad_gateway() {
        let err: ZoriumError = ChainError::Rpc("connection refused".into()).into();
        assert_eq!(err.status_code().as_u16(), 502);
    }

    #[test]
    fn verification_failures_are_bad_request() {
        let err: ZoriumError = ChainError::AmountMismatch {
            expected: "1".into(),
            actual: "2".into(),
        }
        .into();
        assert_eq!(err.status_code().as_u16(), 400);
        assert!(err.to_string().contains("expected 1, found 2"));
    }
}
