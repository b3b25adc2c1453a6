// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing for the collateral key.
//!
//! This module turns the configured private key into a signer and produces
//! the VKey witness set clients merge into their transaction.

use async_trait::async_trait;
use blake2::{digest::consts::U32, Blake2b, Digest};
use ciborium::value::{Integer, Value};
use ed25519_dalek::{Signer, SigningKey};

use super::cbor::Transaction;

type Blake2b256 = Blake2b<U32>;

/// Witness-set map key for VKey witnesses.
const VKEY_WITNESSES_KEY: u64 = 0;

/// Produces witness data for a transaction.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Return the encoded witness set authorizing `tx`.
    async fn sign(&self, tx: &Transaction) -> Result<Vec<u8>, SignerError>;
}

/// Errors that can occur while signing.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Failed to encode witness set: {0}")]
    Encoding(String),
}

/// Ed25519 signer holding the collateral payment key.
pub struct KeySigner {
    signing_key: SigningKey,
}

impl std::fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySigner")
            .field("verifying_key", &hex::encode(self.verifying_key()))
            .finish_non_exhaustive()
    }
}

impl KeySigner {
    /// Create a signer from a hex-encoded 32-byte Ed25519 key.
    ///
    /// # Arguments
    /// * `private_key_hex` - 64 hex characters, no prefix
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let key_bytes = hex::decode(private_key_hex.trim())
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;

        let seed: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            SignerError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            ))
        })?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// The public key whose hash controls the managed address.
    pub fn verifying_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Build `{ 0: [[vkey, signature]] }` over the transaction body hash.
    pub fn witness_set(&self, tx: &Transaction) -> Result<Vec<u8>, SignerError> {
        let body_hash = Blake2b256::digest(tx.body_bytes());
        let signature = self.signing_key.sign(&body_hash);

        let witness = Value::Array(vec![
            Value::Bytes(self.verifying_key().to_vec()),
            Value::Bytes(signature.to_bytes().to_vec()),
        ]);
        let witness_set = Value::Map(vec![(
            Value::Integer(Integer::from(VKEY_WITNESSES_KEY)),
            Value::Array(vec![witness]),
        )]);

        let mut encoded = Vec::new();
        ciborium::ser::into_writer(&witness_set, &mut encoded)
            .map_err(|e| SignerError::Encoding(format!("{e:?}")))?;
        Ok(encoded)
    }
}

#[async_trait]
impl TransactionSigner for KeySigner {
    async fn sign(&self, tx: &Transaction) -> Result<Vec<u8>, SignerError> {
        self.witness_set(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::cbor::fixtures;
    use crate::blockchain::types::{ExUnits, TxInput};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const TEST_KEY: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn sample_tx() -> Transaction {
        let input = TxInput {
            transaction_id: fixtures::tx_id(4),
            index: 0,
        };
        let bytes = fixtures::transaction(&[input], &[ExUnits { memory: 1, steps: 2 }]);
        Transaction::from_cbor(&bytes).unwrap()
    }

    #[test]
    fn test_from_hex() {
        assert!(KeySigner::from_hex(TEST_KEY).is_ok());
        assert!(KeySigner::from_hex("abcd").is_err());
        assert!(KeySigner::from_hex("not hex").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = KeySigner::from_hex(TEST_KEY).unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains(TEST_KEY));
    }

    #[tokio::test]
    async fn test_witness_verifies_against_body_hash() {
        let signer = KeySigner::from_hex(TEST_KEY).unwrap();
        let tx = sample_tx();

        let witness_bytes = signer.sign(&tx).await.unwrap();
        let value: Value = ciborium::de::from_reader(witness_bytes.as_slice()).unwrap();

        let entries = value.as_map().unwrap();
        assert_eq!(entries.len(), 1);
        let witnesses = entries[0].1.as_array().unwrap();
        let pair = witnesses[0].as_array().unwrap();
        let vkey: [u8; 32] = pair[0].as_bytes().unwrap().as_slice().try_into().unwrap();
        let sig: [u8; 64] = pair[1].as_bytes().unwrap().as_slice().try_into().unwrap();

        assert_eq!(vkey, signer.verifying_key());
        let verifying_key = VerifyingKey::from_bytes(&vkey).unwrap();
        let body_hash = Blake2b256::digest(tx.body_bytes());
        assert!(verifying_key
            .verify(&body_hash, &Signature::from_bytes(&sig))
            .is_ok());
    }
}
