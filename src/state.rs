// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::collateral::{RequestValidator, ReserveItem};

/// Shared handler state. The reserve is fixed for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub reserve: Arc<ReserveItem>,
    pub validator: Arc<RequestValidator>,
}

impl AppState {
    pub fn new(reserve: ReserveItem, validator: RequestValidator) -> Self {
        Self {
            reserve: Arc::new(reserve),
            validator: Arc::new(validator),
        }
    }
}
