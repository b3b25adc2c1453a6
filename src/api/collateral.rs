// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Collateral query and signing endpoints.
//!
//! Both routes accept any method so that a wrong method is answered with the
//! usual `{ "error": ... }` body and a 400, rather than axum's bare 405.

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    collateral::{RejectReason, SigningRequest, ValidationOutcome},
    error::ApiError,
    models::{
        GetCollateralRequest, GetCollateralResponse, SignCollateralRequest,
        SignCollateralResponse,
    },
    state::AppState,
};

/// Parse a JSON object body, rejecting anything else with a 400.
fn parse_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Malformed JSON body: {e}")))?;
    if !value.is_object() {
        return Err(ApiError::bad_request("Request body must be a JSON object."));
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

fn decode_hex(field: &str, raw: &str) -> Result<Vec<u8>, ApiError> {
    hex::decode(raw.trim())
        .map_err(|e| RejectReason::BadEncoding(format!("{field} hex: {e}")).into())
}

/// Return the reserved collateral UTxO.
pub async fn get_collateral(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<GetCollateralResponse>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::bad_request(format!(
            "Method {method} not allowed, use GET."
        )));
    }

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        GetCollateralRequest::default()
    } else {
        parse_object::<GetCollateralRequest>(&body)?
    };
    if request.id.is_some() {
        return Err(ApiError::bad_request("The `id` field is not supported."));
    }

    Ok(Json(GetCollateralResponse::from(state.reserve.as_ref())))
}

/// Validate a transaction and, if it is safe, return the collateral witness.
pub async fn sign_collateral(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<SignCollateralResponse>, ApiError> {
    if method != Method::POST {
        return Err(ApiError::bad_request(format!(
            "Method {method} not allowed, use POST."
        )));
    }

    let request = parse_object::<SignCollateralRequest>(&body)?;
    let signing_request = SigningRequest {
        transaction_cbor: decode_hex("transaction", &request.tx_cbor)?,
        additional_inputs: request
            .additional_utxos
            .iter()
            .enumerate()
            .map(|(i, raw)| decode_hex(&format!("additional UTxO {i}"), raw))
            .collect::<Result<Vec<_>, _>>()?,
    };

    match state.validator.validate(&signing_request, &state.reserve).await {
        ValidationOutcome::Accepted(witness) => Ok(Json(SignCollateralResponse {
            witnesses_cbor: hex::encode(witness),
        })),
        ValidationOutcome::Rejected(reason) => Err(reason.into()),
    }
}
