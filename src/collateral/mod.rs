// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Collateral reserve discovery and signing-request validation.

pub mod discovery;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use discovery::{is_eligible, ReserveDiscovery, ReserveItem, MIN_COLLATERAL_LOVELACE};
pub use validator::{
    ExUnitsDimension, RejectReason, RequestValidator, SigningRequest, ValidationOutcome,
};
