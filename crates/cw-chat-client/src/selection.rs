// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Selection resolver for integration selectors
//!
//! When a direct message response sets `requires_selection`, the
//! accompanying selector enumerates a closed set of options. The resolver
//! packages the user's choice into a `SelectionResponse` and builds the
//! follow-up send-message request; validation of the closed option set
//! happens client-side, before anything goes on the wire.

use cw_api_contract::SendMessageRequest;
use cw_domain_types::{IntegrationSelector, SelectionResponse};

use crate::error::{ChatClientError, ChatClientResult};

/// Resolve the user's choice against a selector.
///
/// Free text is rejected locally when `allow_custom` is false. On
/// success, `collected_params` is the selector's accumulator threaded
/// through unmodified except for the newly answered parameter, so
/// multi-parameter collection accumulates correctly across turns.
pub fn resolve_selection(
    selector: &IntegrationSelector,
    value: &str,
) -> ChatClientResult<SelectionResponse> {
    if !selector.has_option_value(value) && !selector.allow_custom {
        return Err(ChatClientError::Validation(format!(
            "\"{}\" is not one of the offered options for {}",
            value, selector.parameter_name
        )));
    }

    let mut collected_params = selector.collected_params.clone();
    collected_params.insert(
        selector.parameter_name.clone(),
        serde_json::Value::String(value.to_string()),
    );

    Ok(SelectionResponse {
        parameter_name: selector.parameter_name.clone(),
        value: value.to_string(),
        pending_action: selector.pending_action.clone(),
        collected_params,
        integration: selector.integration.clone(),
    })
}

/// Build the follow-up request that resends the resolved selection
/// through the ordinary send-message channel.
pub fn build_selection_request(
    selector: &IntegrationSelector,
    response: SelectionResponse,
    model_id: &str,
    conversation_id: Option<&str>,
) -> SendMessageRequest {
    let message = selector
        .original_message
        .clone()
        .unwrap_or_else(|| response.value.clone());

    let mut request = SendMessageRequest::new(message, model_id);
    request.conversation_id = conversation_id.map(str::to_string);
    request.selection_response = Some(response);
    request
}
