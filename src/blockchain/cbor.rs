// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CBOR decoding for Cardano transactions and resolved UTxOs.
//!
//! Semantic decoding goes through `ciborium::Value`. Signatures and the
//! evaluation endpoint need the exact bytes the client sent (the body hash
//! must match what the ledger computes), so item boundaries are located by a
//! small framing pass over the raw input instead of by re-encoding.

use ciborium::value::Value;

use super::types::{ExUnits, Redeemer, RedeemerTag, TransactionId, TxInput};

/// Nesting limit for the framing pass. Real transactions stay far below it.
const MAX_DEPTH: usize = 128;

/// Semantic tag wrapping Conway-era sets.
const SET_TAG: u64 = 258;

/// Major type byte that terminates an indefinite-length item.
const BREAK: u8 = 0xff;

/// Errors raised while decoding CBOR payloads.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("malformed CBOR: {0}")]
    Malformed(String),

    #[error("{0} trailing bytes after CBOR item")]
    TrailingBytes(usize),

    #[error("CBOR nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,

    #[error("unexpected structure: {0}")]
    Structure(String),
}

// =============================================================================
// Framing
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Header {
    major: u8,
    /// `None` for indefinite-length items
    arg: Option<u64>,
    /// Encoded size of the header itself
    len: usize,
}

fn read_uint(bytes: &[u8], start: usize, width: usize) -> Result<u64, CborError> {
    let slice = bytes
        .get(start..start + width)
        .ok_or(CborError::UnexpectedEnd)?;
    Ok(slice.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn read_header(bytes: &[u8], pos: usize) -> Result<Header, CborError> {
    let initial = *bytes.get(pos).ok_or(CborError::UnexpectedEnd)?;
    let major = initial >> 5;
    let info = initial & 0x1f;

    let (arg, extra) = match info {
        0..=23 => (Some(u64::from(info)), 0),
        24 => (Some(read_uint(bytes, pos + 1, 1)?), 1),
        25 => (Some(read_uint(bytes, pos + 1, 2)?), 2),
        26 => (Some(read_uint(bytes, pos + 1, 4)?), 4),
        27 => (Some(read_uint(bytes, pos + 1, 8)?), 8),
        31 if matches!(major, 2..=5 | 7) => (None, 0),
        _ => {
            return Err(CborError::Malformed(format!(
                "reserved additional info {info} for major type {major}"
            )))
        }
    };

    Ok(Header {
        major,
        arg,
        len: 1 + extra,
    })
}

/// Return the offset one past the end of the CBOR item starting at `pos`.
pub fn item_end(bytes: &[u8], pos: usize) -> Result<usize, CborError> {
    skip_item(bytes, pos, 0)
}

fn skip_item(bytes: &[u8], pos: usize, depth: usize) -> Result<usize, CborError> {
    if depth > MAX_DEPTH {
        return Err(CborError::TooDeep);
    }

    let header = read_header(bytes, pos)?;
    let mut cursor = pos + header.len;

    match (header.major, header.arg) {
        (0 | 1 | 7, Some(_)) => Ok(cursor),
        (7, None) => Err(CborError::Malformed("unexpected break".to_string())),
        (2 | 3, Some(len)) => {
            let len = usize::try_from(len).map_err(|_| CborError::UnexpectedEnd)?;
            let end = cursor.checked_add(len).ok_or(CborError::UnexpectedEnd)?;
            if end > bytes.len() {
                return Err(CborError::UnexpectedEnd);
            }
            Ok(end)
        }
        (2 | 3, None) => loop {
            if *bytes.get(cursor).ok_or(CborError::UnexpectedEnd)? == BREAK {
                return Ok(cursor + 1);
            }
            let chunk = read_header(bytes, cursor)?;
            if chunk.major != header.major || chunk.arg.is_none() {
                return Err(CborError::Malformed(
                    "invalid chunk in indefinite string".to_string(),
                ));
            }
            cursor = skip_item(bytes, cursor, depth + 1)?;
        },
        (4 | 5, Some(count)) => {
            let items = if header.major == 5 {
                count.checked_mul(2).ok_or(CborError::UnexpectedEnd)?
            } else {
                count
            };
            for _ in 0..items {
                cursor = skip_item(bytes, cursor, depth + 1)?;
            }
            Ok(cursor)
        }
        (4 | 5, None) => loop {
            if *bytes.get(cursor).ok_or(CborError::UnexpectedEnd)? == BREAK {
                return Ok(cursor + 1);
            }
            cursor = skip_item(bytes, cursor, depth + 1)?;
            if header.major == 5 {
                cursor = skip_item(bytes, cursor, depth + 1)?;
            }
        },
        (6, Some(_)) => skip_item(bytes, cursor, depth + 1),
        (major, _) => Err(CborError::Malformed(format!("invalid major type {major}"))),
    }
}

/// Check that `bytes` holds exactly one CBOR item.
fn ensure_single_item(bytes: &[u8]) -> Result<(), CborError> {
    if bytes.is_empty() {
        return Err(CborError::UnexpectedEnd);
    }
    let end = item_end(bytes, 0)?;
    if end != bytes.len() {
        return Err(CborError::TrailingBytes(bytes.len() - end));
    }
    Ok(())
}

fn parse_value(bytes: &[u8]) -> Result<Value, CborError> {
    ciborium::de::from_reader(bytes).map_err(|e| CborError::Malformed(format!("{e:?}")))
}

// =============================================================================
// Value helpers
// =============================================================================

fn as_u64(value: &Value, what: &str) -> Result<u64, CborError> {
    value
        .as_integer()
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| CborError::Structure(format!("{what} must be an unsigned integer")))
}

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, CborError> {
    value
        .as_array()
        .ok_or_else(|| CborError::Structure(format!("{what} must be an array")))
}

fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<(Value, Value)>, CborError> {
    value
        .as_map()
        .ok_or_else(|| CborError::Structure(format!("{what} must be a map")))
}

/// Unwrap an optional `#6.258` set tag.
fn untag_set(value: &Value) -> &Value {
    match value.as_tag() {
        Some((SET_TAG, inner)) => inner,
        _ => value,
    }
}

/// Reject a map that repeats a key. Lookups only ever see one of the
/// duplicates, while a ledger or another decoder may honor a different one.
fn ensure_unique_keys(entries: &[(Value, Value)], what: &str) -> Result<(), CborError> {
    for (i, (key, _)) in entries.iter().enumerate() {
        if entries[..i].iter().any(|(earlier, _)| earlier == key) {
            return Err(CborError::Structure(format!("{what} has a duplicate key")));
        }
    }
    Ok(())
}

fn map_get(entries: &[(Value, Value)], key: u64) -> Option<&Value> {
    entries.iter().find_map(|(k, v)| {
        let matches = k
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .is_some_and(|k| k == key);
        matches.then_some(v)
    })
}

fn parse_input(value: &Value) -> Result<TxInput, CborError> {
    let fields = as_array(value, "transaction input")?;
    let [id, index] = fields.as_slice() else {
        return Err(CborError::Structure(
            "transaction input must have two fields".to_string(),
        ));
    };
    let id = id
        .as_bytes()
        .ok_or_else(|| CborError::Structure("transaction id must be bytes".to_string()))?;
    Ok(TxInput {
        transaction_id: TransactionId::from_slice(id).map_err(CborError::Structure)?,
        index: as_u64(index, "output index")?,
    })
}

fn parse_ex_units(value: &Value) -> Result<ExUnits, CborError> {
    let fields = as_array(value, "ex_units")?;
    let [memory, steps] = fields.as_slice() else {
        return Err(CborError::Structure("ex_units must have two fields".to_string()));
    };
    Ok(ExUnits {
        memory: as_u64(memory, "ex_units memory")?,
        steps: as_u64(steps, "ex_units steps")?,
    })
}

fn parse_tag(value: &Value) -> Result<RedeemerTag, CborError> {
    let code = as_u64(value, "redeemer tag")?;
    RedeemerTag::from_code(code)
        .ok_or_else(|| CborError::Structure(format!("unknown redeemer tag {code}")))
}

/// Parse the witness-set redeemers in either the legacy array form
/// `[tag, index, data, ex_units]*` or the Conway map form
/// `{ [tag, index] => [data, ex_units] }`.
fn parse_redeemers(value: &Value) -> Result<Vec<Redeemer>, CborError> {
    if let Some(entries) = value.as_array() {
        return entries
            .iter()
            .map(|entry| {
                let fields = as_array(entry, "redeemer")?;
                let [tag, index, _data, ex_units] = fields.as_slice() else {
                    return Err(CborError::Structure(
                        "redeemer must have four fields".to_string(),
                    ));
                };
                Ok(Redeemer {
                    tag: parse_tag(tag)?,
                    index: as_u64(index, "redeemer index")?,
                    ex_units: parse_ex_units(ex_units)?,
                })
            })
            .collect();
    }

    let entries = as_map(value, "redeemers")?;
    ensure_unique_keys(entries, "redeemer map")?;
    entries
        .iter()
        .map(|(key, val)| {
            let key = as_array(key, "redeemer key")?;
            let [tag, index] = key.as_slice() else {
                return Err(CborError::Structure(
                    "redeemer key must have two fields".to_string(),
                ));
            };
            let val = as_array(val, "redeemer value")?;
            let [_data, ex_units] = val.as_slice() else {
                return Err(CborError::Structure(
                    "redeemer value must have two fields".to_string(),
                ));
            };
            Ok(Redeemer {
                tag: parse_tag(tag)?,
                index: as_u64(index, "redeemer index")?,
                ex_units: parse_ex_units(ex_units)?,
            })
        })
        .collect()
}

// =============================================================================
// Transaction
// =============================================================================

/// A decoded Cardano transaction, keeping the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct Transaction {
    raw: Vec<u8>,
    body: Vec<u8>,
    /// Inputs consumed by the transaction (body key 0)
    pub inputs: Vec<TxInput>,
    /// Redeemers in witness-set order
    pub redeemers: Vec<Redeemer>,
}

impl Transaction {
    /// Decode `[body, witness_set, is_valid?, auxiliary_data]`.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CborError> {
        ensure_single_item(bytes)?;

        let header = read_header(bytes, 0)?;
        if header.major != 4 {
            return Err(CborError::Structure("transaction must be an array".to_string()));
        }
        let body_start = header.len;
        let body_end = item_end(bytes, body_start)?;

        let value = parse_value(bytes)?;
        let fields = as_array(&value, "transaction")?;
        if !(3..=4).contains(&fields.len()) {
            return Err(CborError::Structure(format!(
                "transaction must have 3 or 4 fields, got {}",
                fields.len()
            )));
        }

        let body = as_map(&fields[0], "transaction body")?;
        ensure_unique_keys(body, "transaction body")?;
        let inputs = match map_get(body, 0) {
            Some(inputs) => as_array(untag_set(inputs), "inputs")?
                .iter()
                .map(parse_input)
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                return Err(CborError::Structure(
                    "transaction body has no inputs".to_string(),
                ))
            }
        };

        let witness_set = as_map(&fields[1], "witness set")?;
        ensure_unique_keys(witness_set, "witness set")?;
        let redeemers = match map_get(witness_set, 5) {
            Some(redeemers) => parse_redeemers(redeemers)?,
            None => Vec::new(),
        };

        Ok(Self {
            raw: bytes.to_vec(),
            body: bytes[body_start..body_end].to_vec(),
            inputs,
            redeemers,
        })
    }

    /// The full transaction bytes as submitted.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The exact encoded body, which is what the transaction id hashes.
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn spends(&self, input: &TxInput) -> bool {
        self.inputs.iter().any(|candidate| candidate == input)
    }
}

// =============================================================================
// Resolved UTxO
// =============================================================================

/// A `[input, output]` pair supplied alongside a transaction so the provider
/// can evaluate inputs it has not seen on chain yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUtxo {
    pub input: TxInput,
    /// Encoded transaction output, exactly as received
    pub output_cbor: Vec<u8>,
}

impl ResolvedUtxo {
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CborError> {
        ensure_single_item(bytes)?;

        let header = read_header(bytes, 0)?;
        if header.major != 4 {
            return Err(CborError::Structure("UTxO must be an array".to_string()));
        }

        let value = parse_value(bytes)?;
        let fields = as_array(&value, "UTxO")?;
        let [input, output] = fields.as_slice() else {
            return Err(CborError::Structure("UTxO must have two fields".to_string()));
        };
        if output.as_map().is_none() && output.as_array().is_none() {
            return Err(CborError::Structure(
                "transaction output must be a map or an array".to_string(),
            ));
        }

        let output_start = item_end(bytes, header.len)?;
        let output_end = item_end(bytes, output_start)?;

        Ok(Self {
            input: parse_input(input)?,
            output_cbor: bytes[output_start..output_end].to_vec(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for encoded transactions used across the test suites.

    use ciborium::value::{Integer, Value};

    use crate::blockchain::types::{ExUnits, TransactionId, TxInput};

    pub fn int(n: u64) -> Value {
        Value::Integer(Integer::from(n))
    }

    pub fn encode(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out).expect("encode CBOR");
        out
    }

    pub fn tx_id(byte: u8) -> TransactionId {
        TransactionId([byte; 32])
    }

    pub fn input_value(input: &TxInput) -> Value {
        Value::Array(vec![
            Value::Bytes(input.transaction_id.0.to_vec()),
            int(input.index),
        ])
    }

    /// Build a Babbage-style transaction spending `inputs` with one
    /// legacy-format spend redeemer per entry in `redeemers`.
    pub fn transaction(inputs: &[TxInput], redeemers: &[ExUnits]) -> Vec<u8> {
        let body = Value::Map(vec![
            (int(0), Value::Array(inputs.iter().map(input_value).collect())),
            (int(1), Value::Array(vec![])),
            (int(2), int(200_000)),
        ]);
        transaction_with_body(body, redeemers)
    }

    /// Same as [`transaction`] with a caller-built body map.
    pub fn transaction_with_body(body: Value, redeemers: &[ExUnits]) -> Vec<u8> {
        let mut witness_set = Vec::new();
        if !redeemers.is_empty() {
            let entries = redeemers
                .iter()
                .enumerate()
                .map(|(i, units)| {
                    Value::Array(vec![
                        int(0),
                        int(i as u64),
                        int(0),
                        Value::Array(vec![int(units.memory), int(units.steps)]),
                    ])
                })
                .collect();
            witness_set.push((int(5), Value::Array(entries)));
        }

        encode(&Value::Array(vec![
            body,
            Value::Map(witness_set),
            Value::Bool(true),
            Value::Null,
        ]))
    }

    /// Encode a `[input, output]` pair with a post-Alonzo map output.
    pub fn resolved_utxo(input: &TxInput, lovelace: u64) -> Vec<u8> {
        let output = Value::Map(vec![
            (int(0), Value::Bytes(vec![0x60; 29])),
            (int(1), int(lovelace)),
        ]);
        encode(&Value::Array(vec![input_value(input), output]))
    }
}
