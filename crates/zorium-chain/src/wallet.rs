//! Nonce-based wallet sign-in (EIP-191 personal_sign).

use alloy::primitives::{Address, Signature};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::error::{ChainError, ChainResult};

const MAX_TTL_SECS: u64 = 86_400 * 365;

/// A pending sign-in challenge handed to the wallet.
#[derive(Debug, Clone, Serialize)]
pub struct NonceChallenge {
    pub address: String,
    pub nonce: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Pending challenges keyed by wallet address. At most one per address.
#[derive(Debug)]
pub struct NonceStore {
    ttl: Duration,
    pending: DashMap<Address, NonceChallenge>,
}

impl NonceStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            pending: DashMap::new(),
        }
    }

    /// Issue a fresh challenge, replacing any earlier one for `address`.
    pub fn issue(&self, address: Address) -> NonceChallenge {
        self.purge_expired();

        let nonce = hex::encode(rand::random::<[u8; 16]>());
        let challenge = NonceChallenge {
            address: format!("{address:#x}"),
            message: sign_in_message(address, &nonce),
            nonce,
            expires_at: Utc::now() + self.ttl,
        };
        self.pending.insert(address, challenge.clone());
        challenge
    }

    /// Remove the pending challenge and return the message the wallet had to sign.
    pub fn consume(&self, address: Address) -> ChainResult<String> {
        let (_, challenge) = self
            .pending
            .remove(&address)
            .ok_or(ChainError::NonceMissing)?;
        if challenge.expires_at <= Utc::now() {
            return Err(ChainError::NonceExpired);
        }
        Ok(challenge.message)
    }

    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.pending.retain(|_, c| c.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// The text a wallet signs to prove control of `address`.
pub fn sign_in_message(address: Address, nonce: &str) -> String {
    format!(
        "Sign in to Zorium\n\nWallet: {address:#x}\nNonce: {nonce}\n\n\
         This request will not trigger a blockchain transaction or cost any gas."
    )
}

/// Recover the EIP-191 signer of `message`.
pub fn recover_signer(message: &str, signature_hex: &str) -> ChainResult<Address> {
    let raw = signature_hex.trim();
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
        .map_err(|_| ChainError::InvalidSignature)?;
    let signature = Signature::from_raw(&bytes).map_err(|_| ChainError::InvalidSignature)?;
    signature
        .recover_address_from_msg(message)
        .map_err(|_| ChainError::InvalidSignature)
}

/// Check that `signature_hex` over `message` was produced by `address`.
pub fn verify_signature(address: Address, message: &str, signature_hex: &str) -> ChainResult<()> {
    // Address equality is byte-wise, so checksum casing never matters here.
    if recover_signer(message, signature_hex)? == address {
        Ok(())
    } else {
        Err(ChainError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::SignerSync;
    use alloy::signers::local::PrivateKeySigner;

    fn sign(signer: &PrivateKeySigner, message: &str) -> String {
        let sig = signer.sign_message_sync(message.as_bytes()).unwrap();
        format!("0x{}", hex::encode(sig.as_bytes()))
    }

    #[test]
    fn issued_nonce_is_32_hex_chars() {
        let store = NonceStore::new(300);
        let addr = Address::with_last_byte(1);
        let challenge = store.issue(addr);
        assert_eq!(challenge.nonce.len(), 32);
        assert!(challenge.nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(challenge.message.contains(&challenge.nonce));
        assert_eq!(challenge.address, format!("{addr:#x}"));
    }

    #[test]
    fn reissue_replaces_previous_nonce() {
        let store = NonceStore::new(300);
        let addr = Address::with_last_byte(2);
        let first = store.issue(addr);
        let second = store.issue(addr);
        assert_ne!(first.nonce, second.nonce);
        assert_eq!(store.len(), 1);
        assert_eq!(store.consume(addr).unwrap(), second.message);
    }

    #[test]
    fn consume_is_single_use() {
        let store = NonceStore::new(300);
        let addr = Address::with_last_byte(3);
        store.issue(addr);
        assert!(store.consume(addr).is_ok());
        assert!(matches!(store.consume(addr), Err(ChainError::NonceMissing)));
    }

    #[test]
    fn expired_nonce_is_rejected_and_removed() {
        let store = NonceStore::new(0);
        let addr = Address::with_last_byte(4);
        store.issue(addr);
        assert!(matches!(store.consume(addr), Err(ChainError::NonceExpired)));
        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_stale_entries() {
        let store = NonceStore::new(0);
        store.issue(Address::with_last_byte(5));
        store.purge_expired();
        assert!(store.is_empty());
    }

    #[test]
    fn recovers_signer_of_sign_in_message() {
        let signer = PrivateKeySigner::random();
        let message = sign_in_message(signer.address(), "00ff");
        let signature = sign(&signer, &message);

        assert_eq!(recover_signer(&message, &signature).unwrap(), signer.address());
        assert!(verify_signature(signer.address(), &message, &signature).is_ok());
        // Without the 0x prefix too.
        assert!(verify_signature(signer.address(), &message, &signature[2..]).is_ok());
    }

    #[test]
    fn rejects_signature_from_other_wallet() {
        let signer = PrivateKeySigner::random();
        let other = PrivateKeySigner::random();
        let message = sign_in_message(signer.address(), "abcd");
        let signature = sign(&other, &message);

        assert!(matches!(
            verify_signature(signer.address(), &message, &signature),
            Err(ChainError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_signature() {
        let addr = Address::with_last_byte(6);
        assert!(matches!(
            verify_signature(addr, "hi", "0xzz"),
            Err(ChainError::InvalidSignature)
        ));
        assert!(matches!(
            verify_signature(addr, "hi", "0x1234"),
            Err(ChainError::InvalidSignature)
        ));
    }
}
