// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory collaborators for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::blockchain::{
    ChainProvider, ExUnits, ProviderError, ResolvedUtxo, SignerError, Transaction,
    TransactionId, TransactionSigner, TxInput, UnspentOutput,
};

pub fn unspent(id_byte: u8, index: u64, lovelace: u64) -> UnspentOutput {
    UnspentOutput {
        input: TxInput {
            transaction_id: TransactionId([id_byte; 32]),
            index,
        },
        lovelace,
    }
}

/// Scripted provider: replays queued UTxO polls and a fixed evaluation.
#[derive(Default)]
pub struct FakeProvider {
    polls: Mutex<VecDeque<Result<Vec<UnspentOutput>, ProviderError>>>,
    evaluation: Mutex<Option<Result<Vec<ExUnits>, String>>>,
    addresses: Mutex<Vec<String>>,
    utxo_calls: AtomicUsize,
    evaluate_calls: AtomicUsize,
    last_additional: Mutex<Vec<ResolvedUtxo>>,
}

impl FakeProvider {
    pub fn with_polls(polls: Vec<Result<Vec<UnspentOutput>, ProviderError>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Self::default()
        }
    }

    pub fn evaluating(units: Vec<ExUnits>) -> Self {
        Self {
            evaluation: Mutex::new(Some(Ok(units))),
            ..Self::default()
        }
    }

    pub fn failing_evaluation(message: &str) -> Self {
        Self {
            evaluation: Mutex::new(Some(Err(message.to_string()))),
            ..Self::default()
        }
    }

    pub fn utxo_calls(&self) -> usize {
        self.utxo_calls.load(Ordering::SeqCst)
    }

    pub fn evaluate_calls(&self) -> usize {
        self.evaluate_calls.load(Ordering::SeqCst)
    }

    pub fn queried_addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }

    pub fn last_additional(&self) -> Vec<ResolvedUtxo> {
        self.last_additional.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainProvider for FakeProvider {
    async fn unspent_outputs(&self, address: &str) -> Result<Vec<UnspentOutput>, ProviderError> {
        self.utxo_calls.fetch_add(1, Ordering::SeqCst);
        self.addresses.lock().unwrap().push(address.to_string());
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn evaluate(
        &self,
        _tx: &Transaction,
        additional_utxos: &[ResolvedUtxo],
    ) -> Result<Vec<ExUnits>, ProviderError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_additional.lock().unwrap() = additional_utxos.to_vec();
        match self.evaluation.lock().unwrap().clone() {
            Some(Ok(units)) => Ok(units),
            Some(Err(message)) => Err(ProviderError::Evaluation(message)),
            None => Err(ProviderError::Request("no evaluation scripted".into())),
        }
    }
}

/// Signer returning fixed witness bytes, or failing on demand.
pub struct FakeSigner {
    witness: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeSigner {
    pub fn returning(witness: &[u8]) -> Self {
        Self {
            witness: Some(witness.to_vec()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            witness: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    async fn sign(&self, _tx: &Transaction) -> Result<Vec<u8>, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.witness
            .clone()
            .ok_or_else(|| SignerError::Encoding("signer offline".into()))
    }
}
