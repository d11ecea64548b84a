// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authentication configuration
//!
//! The credential is an opaque value supplied by the caller and threaded
//! explicitly into the client; the core has no implicit global state.
//! Request/response calls carry it as a bearer header. The SSE endpoint
//! carries it as a `token` query parameter instead, because that
//! transport does not support custom headers.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{ChatClientError, ChatClientResult};

/// Authentication configuration for the chat service
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    bearer_token: Option<String>,
}

impl AuthConfig {
    /// Authenticate with a bearer-style credential
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    /// Headers for request/response calls
    pub fn headers(&self) -> ChatClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ChatClientError::Auth(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Credential for transports that cannot carry custom headers
    pub fn query_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}
