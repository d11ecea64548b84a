// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the Costwise chat client
//!
//! This crate contains the core domain types shared across the Costwise
//! conversation and governed-task orchestration client: message and
//! conversation records, attachment value objects, task classification
//! results, and integration-selector payloads.
//!
//! These types represent the business domain entities and should be
//! UI-agnostic, reusable across different contexts.

pub mod attachment;
pub mod classification;
pub mod conversation;
pub mod message;
pub mod selector;

// Re-export commonly used types
pub use attachment::*;
pub use classification::*;
pub use conversation::*;
pub use message::*;
pub use selector::*;
