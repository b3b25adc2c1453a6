// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the two collateral endpoints. Field names
//! follow the wire format clients already use (`txCbor`, `witnessesCbor`,
//! `transaction_id`), so the casing is mixed on purpose.

use serde::{Deserialize, Serialize};

use crate::collateral::ReserveItem;

// =============================================================================
// /getCollateral
// =============================================================================

/// Optional body of a collateral query. `id` is reserved and must be absent;
/// an explicit `null` counts as present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetCollateralRequest {
    #[serde(default, deserialize_with = "present")]
    pub id: Option<serde_json::Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Reference to the collateral UTxO.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollateralRef {
    /// Hex-encoded transaction id
    pub transaction_id: String,
    /// Output index within the transaction
    pub index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetCollateralResponse {
    pub collateral: CollateralRef,
}

impl From<&ReserveItem> for GetCollateralResponse {
    fn from(reserve: &ReserveItem) -> Self {
        Self {
            collateral: CollateralRef {
                transaction_id: reserve.transaction_id.to_hex(),
                index: reserve.output_index,
            },
        }
    }
}

// =============================================================================
// /signCollateral
// =============================================================================

/// Transaction to countersign, plus UTxOs the provider cannot resolve itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignCollateralRequest {
    /// Hex-encoded transaction CBOR
    #[serde(rename = "txCbor")]
    pub tx_cbor: String,
    /// Hex-encoded `[input, output]` pairs
    #[serde(rename = "additionalUTxOs")]
    pub additional_utxos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignCollateralResponse {
    /// Hex-encoded witness set
    #[serde(rename = "witnessesCbor")]
    pub witnesses_cbor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::TransactionId;

    #[test]
    fn collateral_response_uses_wire_names() {
        let reserve = ReserveItem {
            transaction_id: TransactionId([0x0f; 32]),
            output_index: 3,
            value_amount: 5_000_000,
        };
        let json = serde_json::to_value(GetCollateralResponse::from(&reserve)).unwrap();
        assert_eq!(json["collateral"]["transaction_id"], "0f".repeat(32));
        assert_eq!(json["collateral"]["index"], 3);
    }

    #[test]
    fn sign_request_requires_both_fields() {
        let ok: SignCollateralRequest =
            serde_json::from_str(r#"{"txCbor":"84","additionalUTxOs":["82"]}"#).unwrap();
        assert_eq!(ok.tx_cbor, "84");
        assert_eq!(ok.additional_utxos, vec!["82".to_string()]);

        assert!(serde_json::from_str::<SignCollateralRequest>(r#"{"txCbor":"84"}"#).is_err());
        assert!(serde_json::from_str::<SignCollateralRequest>(
            r#"{"txCbor":1,"additionalUTxOs":[]}"#
        )
        .is_err());
    }

    #[test]
    fn collateral_request_distinguishes_absent_and_null_id() {
        let empty: GetCollateralRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.id.is_none());

        let null: GetCollateralRequest = serde_json::from_str(r#"{"id":null}"#).unwrap();
        assert!(null.id.is_some());

        assert!(serde_json::from_str::<GetCollateralRequest>("5").is_err());
    }
}
