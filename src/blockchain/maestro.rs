// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Maestro REST client implementing [`ChainProvider`].

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use url::Url;

use super::cbor::{ResolvedUtxo, Transaction};
use super::provider::{ChainProvider, ProviderError};
use super::types::{
    ExUnits, NetworkConfig, Redeemer, RedeemerTag, TransactionId, TxInput, UnspentOutput,
};

const API_KEY_HEADER: &str = "api-key";
const LOVELACE_UNIT: &str = "lovelace";
const PAGE_SIZE: &str = "100";

/// Upper bound on pages walked for one address listing.
const MAX_PAGES: usize = 1_000;

/// Maestro client bound to one network.
#[derive(Debug, Clone)]
pub struct MaestroClient {
    network: NetworkConfig,
    base_url: Url,
    api_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct Paginated<T> {
    data: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MaestroUtxo {
    tx_hash: String,
    index: u64,
    #[serde(default)]
    assets: Vec<MaestroAsset>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct MaestroAsset {
    unit: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    amount: u64,
}

#[derive(Debug, Serialize)]
struct EvaluateRequest {
    cbor: String,
    additional_utxos: Vec<AdditionalUtxo>,
}

#[derive(Debug, Serialize)]
struct AdditionalUtxo {
    tx_hash: String,
    index: u64,
    txout_cbor: String,
}

#[derive(Debug, Deserialize)]
struct EvaluatedRedeemer {
    ex_units: MaestroExUnits,
    redeemer_index: u64,
    redeemer_tag: String,
}

#[derive(Debug, Deserialize)]
struct MaestroExUnits {
    mem: u64,
    steps: u64,
}

impl MaestroClient {
    /// Create a client for `network` with a per-request `timeout`.
    pub fn new(
        network: NetworkConfig,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base_url = Url::parse(network.maestro_url)
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            network,
            base_url,
            api_key: api_key.into(),
            http,
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChainProvider for MaestroClient {
    async fn unspent_outputs(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError> {
        let url = self.endpoint(&format!("addresses/{address}/utxos"))?;
        let client = self;
        let url = &url;

        let utxos = collect_pages(move |cursor: Option<String>| async move {
            let mut request = client.http.get(url.clone()).query(&[("count", PAGE_SIZE)]);
            if let Some(cursor) = cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }
            client.send::<Paginated<MaestroUtxo>>(request).await
        })
        .await?;

        let outputs = utxos
            .into_iter()
            .map(to_unspent_output)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(address, count = outputs.len(), "Fetched address UTxOs");
        Ok(outputs)
    }

    async fn evaluate(
        &self,
        tx: &Transaction,
        additional_utxos: &[ResolvedUtxo],
    ) -> Result<Vec<ExUnits>, ProviderError> {
        let url = self.endpoint("transactions/evaluate")?;
        let body = EvaluateRequest {
            cbor: hex::encode(tx.as_bytes()),
            additional_utxos: additional_utxos
                .iter()
                .map(|utxo| AdditionalUtxo {
                    tx_hash: utxo.input.transaction_id.to_hex(),
                    index: utxo.input.index,
                    txout_cbor: hex::encode(&utxo.output_cbor),
                })
                .collect(),
        };

        let evaluated: Vec<EvaluatedRedeemer> = self.send(self.http.post(url).json(&body)).await?;
        align_evaluations(&tx.redeemers, evaluated)
    }
}

/// Walk a cursor-paginated listing, calling `fetch` with the previous page's
/// cursor until none is returned. An empty cursor also ends the walk, while a
/// cursor seen before or more than [`MAX_PAGES`] pages is a provider fault.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Paginated<T>, ProviderError>>,
{
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = None;

    for _ in 0..MAX_PAGES {
        let page = fetch(cursor.take()).await?;
        items.extend(page.data);

        match page.next_cursor {
            Some(next) if !next.is_empty() => {
                if !seen.insert(next.clone()) {
                    return Err(ProviderError::InvalidResponse(format!(
                        "pagination cursor `{next}` repeated"
                    )));
                }
                cursor = Some(next);
            }
            _ => return Ok(items),
        }
    }

    Err(ProviderError::InvalidResponse(format!(
        "pagination did not end after {MAX_PAGES} pages"
    )))
}

fn to_unspent_output(utxo: MaestroUtxo) -> Result<UnspentOutput, ProviderError> {
    let transaction_id =
        TransactionId::from_hex(&utxo.tx_hash).map_err(ProviderError::InvalidResponse)?;
    let lovelace = utxo
        .assets
        .iter()
        .filter(|asset| asset.unit == LOVELACE_UNIT)
        .fold(0u64, |total, asset| total.saturating_add(asset.amount));

    Ok(UnspentOutput {
        input: TxInput {
            transaction_id,
            index: utxo.index,
        },
        lovelace,
    })
}

/// Order evaluation results by the transaction's own redeemer list.
fn align_evaluations(
    redeemers: &[Redeemer],
    evaluated: Vec<EvaluatedRedeemer>,
) -> Result<Vec<ExUnits>, ProviderError> {
    let mut by_pointer = HashMap::with_capacity(evaluated.len());
    for entry in evaluated {
        let tag = RedeemerTag::from_name(&entry.redeemer_tag).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("unknown redeemer tag `{}`", entry.redeemer_tag))
        })?;
        let units = ExUnits {
            memory: entry.ex_units.mem,
            steps: entry.ex_units.steps,
        };
        if by_pointer.insert((tag, entry.redeemer_index), units).is_some() {
            return Err(ProviderError::InvalidResponse(format!(
                "duplicate evaluation for {tag} redeemer {}",
                entry.redeemer_index
            )));
        }
    }

    redeemers
        .iter()
        .map(|redeemer| {
            by_pointer
                .get(&(redeemer.tag, redeemer.index))
                .copied()
                .ok_or_else(|| {
                    ProviderError::Evaluation(format!(
                        "no evaluation returned for {} redeemer {}",
                        redeemer.tag, redeemer.index
                    ))
                })
        })
        .collect()
}
