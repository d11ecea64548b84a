// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Costwise chat REST API contract types, normalization and validation
//!
//! This crate defines the wire schema for the conversation and
//! governed-task endpoints, the normalization boundary that reconciles
//! legacy and modern payload shapes into domain records, and validation
//! for outbound requests. These types are shared between the client and
//! any mock server implementation.

pub mod error;
pub mod normalize;
pub mod types;
pub mod validation;

pub use error::*;
pub use normalize::*;
pub use types::*;
