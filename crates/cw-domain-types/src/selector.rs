// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Integration selector payloads
//!
//! An integration selector is a mid-conversation parameter-collection
//! prompt: the server enumerates a closed set of options for one
//! parameter (optionally allowing free text) and the client answers by
//! resending a `SelectionResponse` through the ordinary send-message
//! channel. `collected_params` accumulates previously answered
//! parameters across rounds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selectable option with a stable `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorOption {
    pub id: String,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A parameter-collection prompt returned alongside a message.
///
/// Owned by the message that requested it until a response is submitted;
/// resolved selectors are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSelector {
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<SelectorOption>,
    #[serde(rename = "allowCustom", default)]
    pub allow_custom: bool,
    #[serde(rename = "customPlaceholder", skip_serializing_if = "Option::is_none")]
    pub custom_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<String>,
    #[serde(rename = "pendingAction", skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<serde_json::Value>,
    #[serde(rename = "collectedParams", default)]
    pub collected_params: HashMap<String, serde_json::Value>,
    #[serde(rename = "originalMessage", skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
}

impl IntegrationSelector {
    /// Whether `value` is one of the enumerated option values
    pub fn has_option_value(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// The packaged answer to a selector, resent via send-message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResponse {
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
    pub value: String,
    #[serde(rename = "pendingAction", skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<serde_json::Value>,
    #[serde(rename = "collectedParams", default)]
    pub collected_params: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<String>,
}
