// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::any, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{error::ApiError, state::AppState};

pub mod collateral;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/getCollateral", any(collateral::get_collateral))
        .route("/signCollateral", any(collateral::sign_collateral))
        .fallback(invalid_path)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn invalid_path() -> ApiError {
    ApiError::bad_request("Invalid path.")
}
