// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cardano integration module.
//!
//! This module provides functionality for:
//! - Decoding transactions and resolved UTxOs from CBOR
//! - Querying UTxOs and evaluating scripts through Maestro
//! - Signing transactions with the collateral key
//! - Deriving the managed address

pub mod address;
pub mod cbor;
pub mod maestro;
pub mod provider;
pub mod signing;
pub mod types;

pub use address::{enterprise_address, AddressError};
pub use cbor::{CborError, ResolvedUtxo, Transaction};
pub use maestro::MaestroClient;
pub use provider::{ChainProvider, ProviderError};
pub use signing::{KeySigner, SignerError, TransactionSigner};
pub use types::*;
