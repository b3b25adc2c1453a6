// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain data provider interface.

use async_trait::async_trait;

use super::cbor::{ResolvedUtxo, Transaction};
use super::types::{ExUnits, UnspentOutput};

/// Read-side access to the chain: UTxO lookup and script evaluation.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// All unspent outputs currently held by `address`, in provider order.
    async fn unspent_outputs(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError>;

    /// Evaluate every redeemer of `tx`.
    ///
    /// The result is aligned with `tx.redeemers`: entry `i` is the evaluated
    /// budget of the transaction's `i`-th redeemer.
    async fn evaluate(
        &self,
        tx: &Transaction,
        additional_utxos: &[ResolvedUtxo],
    ) -> Result<Vec<ExUnits>, ProviderError>;
}

/// Errors that can occur talking to the chain provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}
