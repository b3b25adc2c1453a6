// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address derivation for the managed collateral key.

use bech32::{Bech32, Hrp};
use blake2::{digest::consts::U28, Blake2b, Digest};

use super::types::NetworkConfig;

type Blake2b224 = Blake2b<U28>;

/// Header nibble for an enterprise address with a key-hash payment part.
const ENTERPRISE_KEY_HASH: u8 = 0b0110;

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid address prefix: {0}")]
    InvalidPrefix(String),

    #[error("Failed to encode address: {0}")]
    Encoding(String),
}

/// Enterprise address (no staking part) for `verifying_key` on `network`.
pub fn enterprise_address(
    verifying_key: &[u8; 32],
    network: &NetworkConfig,
) -> Result<String, AddressError> {
    let key_hash = Blake2b224::digest(verifying_key);

    let mut payload = Vec::with_capacity(1 + key_hash.len());
    payload.push((ENTERPRISE_KEY_HASH << 4) | (network.network_id & 0x0f));
    payload.extend_from_slice(&key_hash);

    let hrp = Hrp::parse(network.address_hrp)
        .map_err(|e| AddressError::InvalidPrefix(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, &payload).map_err(|e| AddressError::Encoding(e.to_string()))
}
