// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Validator
//!
//! Decides whether a client transaction may be countersigned with the
//! collateral key. Checks run in a fixed order and stop at the first
//! failure:
//!
//! 1. Decode the transaction and the additional UTxOs.
//! 2. Reject any transaction that spends the reserve.
//! 3. Reject transactions without redeemers (nothing needs collateral).
//! 4. Evaluate the scripts through the provider.
//! 5. Reject if any redeemer claims more memory or steps than evaluated.
//! 6. Sign.
//!
//! The reserve check runs before the provider is contacted. Nothing is
//! mutated on any path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::blockchain::{
    ChainProvider, ExUnits, Redeemer, ResolvedUtxo, Transaction, TransactionSigner,
};

use super::discovery::ReserveItem;

/// A client request to countersign a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// Encoded transaction
    pub transaction_cbor: Vec<u8>,
    /// Encoded `[input, output]` pairs not yet known to the provider
    pub additional_inputs: Vec<Vec<u8>>,
}

/// Execution budget dimension that failed the cost comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExUnitsDimension {
    Memory,
    Steps,
}

impl fmt::Display for ExUnitsDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExUnitsDimension::Memory => f.write_str("memory"),
            ExUnitsDimension::Steps => f.write_str("steps"),
        }
    }
}

/// Why a signing request was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Failed to decode {0}")]
    BadEncoding(String),

    #[error("Transaction spends the collateral UTxO")]
    ReserveWouldBeSpent,

    #[error("Transaction has no redeemers, collateral is not required")]
    NoRedeemers,

    #[error("Redeemer {index} claims more {dimension} than evaluated")]
    CostUnderEvaluated {
        index: usize,
        dimension: ExUnitsDimension,
    },

    #[error("Transaction evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl RejectReason {
    /// Whether the client is at fault (as opposed to the provider or signer).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            RejectReason::EvaluationFailed(_) | RejectReason::SigningFailed(_)
        )
    }
}

/// Result of validating a [`SigningRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Encoded witness set
    Accepted(Vec<u8>),
    Rejected(RejectReason),
}

/// Default bound on each provider and signer call.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Validates signing requests against the reserve and signs accepted ones.
pub struct RequestValidator {
    provider: Arc<dyn ChainProvider>,
    signer: Arc<dyn TransactionSigner>,
    call_timeout: Duration,
}

impl RequestValidator {
    pub fn new(provider: Arc<dyn ChainProvider>, signer: Arc<dyn TransactionSigner>) -> Self {
        Self {
            provider,
            signer,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn validate(&self, request: &SigningRequest, reserve: &ReserveItem) -> ValidationOutcome {
        match self.run(request, reserve).await {
            Ok(witness) => ValidationOutcome::Accepted(witness),
            Err(reason) => {
                tracing::info!(reason = %reason, "Signing request rejected");
                ValidationOutcome::Rejected(reason)
            }
        }
    }

    async fn run(&self, request: &SigningRequest, reserve: &ReserveItem) -> Result<Vec<u8>, RejectReason> {
        let tx = Transaction::from_cbor(&request.transaction_cbor)
            .map_err(|e| RejectReason::BadEncoding(format!("transaction: {e}")))?;

        let additional = request
            .additional_inputs
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                ResolvedUtxo::from_cbor(raw)
                    .map_err(|e| RejectReason::BadEncoding(format!("additional UTxO {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if tx.spends(&reserve.outpoint()) {
            tracing::warn!(reserve = %reserve.outpoint(), "Rejected attempt to spend the reserve");
            return Err(RejectReason::ReserveWouldBeSpent);
        }

        if tx.redeemers.is_empty() {
            return Err(RejectReason::NoRedeemers);
        }

        let evaluated = timeout(self.call_timeout, self.provider.evaluate(&tx, &additional))
            .await
            .map_err(|_| RejectReason::EvaluationFailed("provider timed out".to_string()))?
            .map_err(|e| RejectReason::EvaluationFailed(e.to_string()))?;

        compare_ex_units(&tx.redeemers, &evaluated)?;

        let witness = timeout(self.call_timeout, self.signer.sign(&tx))
            .await
            .map_err(|_| RejectReason::SigningFailed("signer timed out".to_string()))?
            .map_err(|e| RejectReason::SigningFailed(e.to_string()))?;

        tracing::info!(
            inputs = tx.inputs.len(),
            redeemers = tx.redeemers.len(),
            "Signed collateral witness"
        );
        Ok(witness)
    }
}

/// Require every evaluated budget to cover what the redeemer claims.
fn compare_ex_units(claimed: &[Redeemer], evaluated: &[ExUnits]) -> Result<(), RejectReason> {
    if claimed.len() != evaluated.len() {
        return Err(RejectReason::EvaluationFailed(format!(
            "provider returned {} evaluations for {} redeemers",
            evaluated.len(),
            claimed.len()
        )));
    }

    for (index, (redeemer, actual)) in claimed.iter().zip(evaluated).enumerate() {
        if actual.memory < redeemer.ex_units.memory {
            return Err(RejectReason::CostUnderEvaluated {
                index,
                dimension: ExUnitsDimension::Memory,
            });
        }
        if actual.steps < redeemer.ex_units.steps {
            return Err(RejectReason::CostUnderEvaluated {
                index,
                dimension: ExUnitsDimension::Steps,
            });
        }
    }
    Ok(())
}
