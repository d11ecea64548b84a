// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error taxonomy for the chat client
//!
//! Low-level transport errors are re-wrapped into this taxonomy with the
//! transport's stable code tag preserved verbatim (`ECONNABORTED`,
//! `ERR_NETWORK`) so callers can branch on it. The original response
//! payload is attached when present so the UI can show server-provided
//! detail. Nothing here retries; retry decisions belong to the caller.

use cw_api_contract::ProblemDetails;
use reqwest::StatusCode;
use thiserror::Error;

/// Transport code for requests that exceeded their deadline
pub const CODE_TIMEOUT: &str = "ECONNABORTED";
/// Transport code for connectivity failures
pub const CODE_NETWORK: &str = "ERR_NETWORK";

/// Result type for chat client operations
pub type ChatClientResult<T> = Result<T, ChatClientError>;

/// Errors that can occur when communicating with the chat service
#[derive(Debug, Error)]
pub enum ChatClientError {
    /// Request exceeded its deadline; large files or complex requests are
    /// the usual cause
    #[error("Request timed out ({code}). Large files or complex requests may take longer")]
    Timeout { code: &'static str },

    /// No connectivity to the service
    #[error("Network unreachable ({code})")]
    Network { code: &'static str },

    /// Non-2xx with a structured message from the backend
    #[error("Server error {status}: {}", .details.detail)]
    Server {
        status: StatusCode,
        details: ProblemDetails,
    },

    /// Non-2xx whose body was not a structured problem; raw body attached
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// SSE transport error or unparsable terminal state
    #[error("Stream error: {0}")]
    Stream(String),

    /// Local validation failure, no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport error that is neither a timeout nor a connectivity failure
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ChatClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatClientError::Timeout { code: CODE_TIMEOUT }
        } else if err.is_connect() {
            ChatClientError::Network { code: CODE_NETWORK }
        } else {
            ChatClientError::Http(err)
        }
    }
}

impl ChatClientError {
    /// The preserved transport code, when this error carries one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ChatClientError::Timeout { code } | ChatClientError::Network { code } => Some(code),
            _ => None,
        }
    }

    /// Server-provided detail, when the backend sent a structured message
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            ChatClientError::Server { details, .. } => Some(&details.detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_codes_are_preserved() {
        let timeout = ChatClientError::Timeout { code: CODE_TIMEOUT };
        assert_eq!(timeout.code(), Some("ECONNABORTED"));

        let network = ChatClientError::Network { code: CODE_NETWORK };
        assert_eq!(network.code(), Some("ERR_NETWORK"));

        let validation = ChatClientError::Validation("bad value".to_string());
        assert_eq!(validation.code(), None);
    }

    #[test]
    fn server_detail_is_surfaced_verbatim() {
        let err = ChatClientError::Server {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            details: ProblemDetails {
                problem_type: "about:blank".to_string(),
                title: "Unprocessable".to_string(),
                status: Some(422),
                detail: "Model id is not enabled for this tenant".to_string(),
                errors: Default::default(),
            },
        };
        assert_eq!(
            err.server_detail(),
            Some("Model id is not enabled for this tenant")
        );
        assert!(err.to_string().contains("Model id is not enabled"));
    }
}
