// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

/// Cardano network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Network id carried in address headers (1 mainnet, 0 testnets)
    pub network_id: u8,
    /// Maestro API base URL
    pub maestro_url: &'static str,
    /// Bech32 human-readable prefix for payment addresses
    pub address_hrp: &'static str,
}

/// Cardano mainnet configuration.
pub const CARDANO_MAINNET: NetworkConfig = NetworkConfig {
    name: "Cardano Mainnet",
    network_id: 1,
    maestro_url: "https://mainnet.gomaestro-api.org/v1/",
    address_hrp: "addr",
};

/// Cardano pre-production testnet configuration.
pub const CARDANO_PREPROD: NetworkConfig = NetworkConfig {
    name: "Cardano Preprod",
    network_id: 0,
    maestro_url: "https://preprod.gomaestro-api.org/v1/",
    address_hrp: "addr_test",
};

/// Cardano preview testnet configuration.
pub const CARDANO_PREVIEW: NetworkConfig = NetworkConfig {
    name: "Cardano Preview",
    network_id: 0,
    maestro_url: "https://preview.gomaestro-api.org/v1/",
    address_hrp: "addr_test",
};

/// Networks supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    pub fn config(self) -> NetworkConfig {
        match self {
            Network::Mainnet => CARDANO_MAINNET,
            Network::Preprod => CARDANO_PREPROD,
            Network::Preview => CARDANO_PREVIEW,
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "preprod" => Ok(Network::Preprod),
            "preview" => Ok(Network::Preview),
            other => Err(format!(
                "Network `{other}` invalid (expected Mainnet, Preprod or Preview)"
            )),
        }
    }
}

/// Blake2b-256 hash identifying a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub [u8; 32]);

impl TransactionId {
    pub fn from_hex(raw: &str) -> Result<Self, String> {
        let bytes = hex::decode(raw).map_err(|e| format!("invalid transaction id hex: {e}"))?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| format!("transaction id must be 32 bytes, got {}", bytes.len()))?;
        Ok(Self(array))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Reference to a transaction output: `(transaction_id, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxInput {
    pub transaction_id: TransactionId,
    pub index: u64,
}

impl fmt::Display for TxInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.index)
    }
}

/// An unspent output as reported by the chain provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentOutput {
    pub input: TxInput,
    /// Lovelace held by the output
    pub lovelace: u64,
}

/// Script execution budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExUnits {
    pub memory: u64,
    pub steps: u64,
}

/// Purpose of a redeemer, as encoded in the transaction witness set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Cert,
    Reward,
    Vote,
    Propose,
}

impl RedeemerTag {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(RedeemerTag::Spend),
            1 => Some(RedeemerTag::Mint),
            2 => Some(RedeemerTag::Cert),
            3 => Some(RedeemerTag::Reward),
            4 => Some(RedeemerTag::Vote),
            5 => Some(RedeemerTag::Propose),
            _ => None,
        }
    }

    /// Parse the tag names used by evaluation endpoints.
    ///
    /// Providers disagree on naming for certificates and withdrawals, so
    /// both ledger and Ogmios spellings are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "spend" => Some(RedeemerTag::Spend),
            "mint" => Some(RedeemerTag::Mint),
            "cert" | "publish" => Some(RedeemerTag::Cert),
            "reward" | "withdraw" | "wdrl" => Some(RedeemerTag::Reward),
            "vote" => Some(RedeemerTag::Vote),
            "propose" => Some(RedeemerTag::Propose),
            _ => None,
        }
    }
}

impl fmt::Display for RedeemerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RedeemerTag::Spend => "spend",
            RedeemerTag::Mint => "mint",
            RedeemerTag::Cert => "cert",
            RedeemerTag::Reward => "reward",
            RedeemerTag::Vote => "vote",
            RedeemerTag::Propose => "propose",
        };
        f.write_str(name)
    }
}

/// A redeemer's pointer and claimed execution budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeemer {
    pub tag: RedeemerTag,
    pub index: u64,
    pub ex_units: ExUnits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Mainnet".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!("PREPROD".parse::<Network>(), Ok(Network::Preprod));
        assert_eq!(" preview ".parse::<Network>(), Ok(Network::Preview));
        assert!("Testnet".parse::<Network>().is_err());
    }

    #[test]
    fn network_config_matches_network_id() {
        assert_eq!(Network::Mainnet.config().network_id, 1);
        assert_eq!(Network::Preprod.config().address_hrp, "addr_test");
        assert!(Network::Preview.config().maestro_url.starts_with("https://preview."));
    }

    #[test]
    fn transaction_id_hex_round_trip() {
        let raw = "ab".repeat(32);
        let id = TransactionId::from_hex(&raw).unwrap();
        assert_eq!(id.to_hex(), raw);
        assert!(TransactionId::from_hex("abcd").is_err());
        assert!(TransactionId::from_hex("zz").is_err());
    }

    #[test]
    fn redeemer_tag_accepts_provider_aliases() {
        assert_eq!(RedeemerTag::from_name("withdraw"), Some(RedeemerTag::Reward));
        assert_eq!(RedeemerTag::from_name("publish"), Some(RedeemerTag::Cert));
        assert_eq!(RedeemerTag::from_name("Spend"), Some(RedeemerTag::Spend));
        assert_eq!(RedeemerTag::from_name("unknown"), None);
        assert_eq!(RedeemerTag::from_code(6), None);
    }
}
