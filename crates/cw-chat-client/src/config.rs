// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client configuration types

use serde::{Deserialize, Serialize};

/// Network configuration for the chat client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chat service base URL
    #[serde(rename = "service-base-url")]
    pub service_base_url: Option<String>,
}
