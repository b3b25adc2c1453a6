// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Collateral Provider - Custodial Cardano Collateral Service
//!
//! This crate holds a single UTxO reserved as script collateral and
//! countersigns client transactions that use it, without ever authorizing
//! the reserve to be spent.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Cardano encoding, Maestro provider, signing
//! - `collateral` - Reserve discovery and request validation

pub mod api;
pub mod blockchain;
pub mod collateral;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
