// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Reserve Discovery
//!
//! Startup task that waits until the managed address holds a UTxO large
//! enough to serve as collateral, then publishes it as the process-wide
//! reserve.
//!
//! ## Strategy
//!
//! Every `poll_interval` (10 s) the discovery loop:
//! 1. Lists every UTxO at the managed address.
//! 2. Picks the first one, in provider order, holding at least
//!    [`MIN_COLLATERAL_LOVELACE`].
//! 3. Otherwise logs the deposit address and the required amount and waits.
//!
//! Provider failures are logged and polled through. Discovery has no failure
//! mode: the service does not serve traffic until it returns.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::blockchain::{ChainProvider, TransactionId, TxInput, UnspentOutput};

/// Minimum lovelace a UTxO must hold to be used as the reserve (5 ada).
pub const MIN_COLLATERAL_LOVELACE: u64 = 5_000_000;

/// Interval between polls while waiting for a deposit.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// The UTxO reserved as collateral for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveItem {
    pub transaction_id: TransactionId,
    pub output_index: u64,
    /// Lovelace held by the reserve
    pub value_amount: u64,
}

impl ReserveItem {
    /// The `(transaction_id, index)` pair identifying the reserve on chain.
    pub fn outpoint(&self) -> TxInput {
        TxInput {
            transaction_id: self.transaction_id,
            index: self.output_index,
        }
    }
}

impl From<&UnspentOutput> for ReserveItem {
    fn from(output: &UnspentOutput) -> Self {
        Self {
            transaction_id: output.input.transaction_id,
            output_index: output.input.index,
            value_amount: output.lovelace,
        }
    }
}

/// Whether a UTxO holding `lovelace` may back collateral.
pub fn is_eligible(lovelace: u64) -> bool {
    lovelace >= MIN_COLLATERAL_LOVELACE
}

/// Polls the provider until an eligible reserve exists at `address`.
pub struct ReserveDiscovery {
    provider: Arc<dyn ChainProvider>,
    address: String,
    poll_interval: Duration,
}

impl ReserveDiscovery {
    pub fn new(provider: Arc<dyn ChainProvider>, address: impl Into<String>) -> Self {
        Self {
            provider,
            address: address.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Block until an eligible reserve is found and return it.
    pub async fn discover(&self) -> ReserveItem {
        info!(
            address = %self.address,
            min_lovelace = MIN_COLLATERAL_LOVELACE,
            "Reserve discovery starting"
        );

        let mut attempt: u64 = 0;
        loop {
            if let Some(reserve) = self.poll_once().await {
                info!(
                    tx_id = %reserve.transaction_id,
                    index = reserve.output_index,
                    lovelace = reserve.value_amount,
                    attempts = attempt + 1,
                    "Collateral reserve selected"
                );
                return reserve;
            }

            warn!(
                attempt,
                address = %self.address,
                required_lovelace = MIN_COLLATERAL_LOVELACE,
                "Please deposit a UTxO with at least 5 ada to the collateral provider address"
            );
            attempt += 1;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Execute one poll: fetch UTxOs and pick the first eligible one.
    async fn poll_once(&self) -> Option<ReserveItem> {
        match self.provider.unspent_outputs(&self.address).await {
            Ok(outputs) => outputs
                .iter()
                .find(|output| is_eligible(output.lovelace))
                .map(ReserveItem::from),
            Err(e) => {
                warn!(error = %e, "Reserve discovery poll failed, will retry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ProviderError;
    use crate::collateral::testing::{unspent, FakeProvider};

    const ADDRESS: &str = "addr_test1vqexample";

    fn discovery(provider: Arc<FakeProvider>) -> ReserveDiscovery {
        ReserveDiscovery::new(provider, ADDRESS).with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn eligibility_threshold_is_five_ada() {
        assert!(!is_eligible(0));
        assert!(!is_eligible(MIN_COLLATERAL_LOVELACE - 1));
        assert!(is_eligible(MIN_COLLATERAL_LOVELACE));
        assert!(is_eligible(u64::MAX));
    }

    #[tokio::test]
    async fn returns_first_eligible_output_in_provider_order() {
        let provider = Arc::new(FakeProvider::with_polls(vec![Ok(vec![
            unspent(1, 0, 4_999_999),
            unspent(2, 1, 6_000_000),
            unspent(3, 0, 9_000_000),
        ])]));

        let reserve = discovery(provider.clone()).discover().await;

        assert_eq!(reserve, ReserveItem::from(&unspent(2, 1, 6_000_000)));
        assert_eq!(provider.utxo_calls(), 1);
        assert_eq!(provider.queried_addresses(), vec![ADDRESS.to_string()]);
    }

    #[tokio::test]
    async fn keeps_polling_until_a_deposit_arrives() {
        let n = 3;
        let mut polls: Vec<Result<Vec<UnspentOutput>, ProviderError>> = (0..n)
            .map(|i| Ok(vec![unspent(1, i, 1_000_000)]))
            .collect();
        polls.push(Ok(vec![unspent(1, 0, 1_000_000), unspent(5, 2, 5_000_000)]));
        let provider = Arc::new(FakeProvider::with_polls(polls));

        let reserve = discovery(provider.clone()).discover().await;

        assert_eq!(reserve.transaction_id, crate::blockchain::TransactionId([5; 32]));
        assert_eq!(reserve.output_index, 2);
        assert!(is_eligible(reserve.value_amount));
        assert_eq!(provider.utxo_calls(), n as usize + 1);
    }

    #[tokio::test]
    async fn provider_errors_are_retried() {
        let provider = Arc::new(FakeProvider::with_polls(vec![
            Err(ProviderError::Request("connection refused".into())),
            Ok(vec![]),
            Ok(vec![unspent(8, 0, 5_000_000)]),
        ]));

        let reserve = discovery(provider.clone()).discover().await;

        assert_eq!(reserve.outpoint().index, 0);
        assert_eq!(provider.utxo_calls(), 3);
    }
}
