//! API contract types for the Costwise chat REST service

use cw_domain_types::{
    GovernedTasks, IntegrationSelector, MessageAttachment, MessageRole, MessageType, PlanState,
    SelectionResponse, TaskClassification,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Send-message request body for `POST /chat/message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[serde(rename = "modelId")]
    #[validate(length(min = 1, message = "Model id cannot be empty"))]
    pub model_id: String,
    #[serde(rename = "conversationId", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(rename = "documentIds", skip_serializing_if = "Vec::is_empty", default)]
    pub document_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(rename = "templateId", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "selectionResponse", skip_serializing_if = "Option::is_none")]
    pub selection_response: Option<SelectionResponse>,
}

impl SendMessageRequest {
    /// Minimal request carrying just a message and model
    pub fn new(message: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model_id: model_id.into(),
            conversation_id: None,
            document_ids: Vec::new(),
            attachments: Vec::new(),
            template_id: None,
            selection_response: None,
        }
    }
}

/// Raw message payload as the server sends it.
///
/// This shape is deliberately permissive: it accepts both the modern
/// `requiresSelection`/`selection` pair and the legacy
/// `requiresIntegrationSelector`/`integrationSelectorData` aliases, plus
/// the partial provider-result shapes reconciled by
/// [`crate::normalize::normalize_message`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: String,
    /// Date-bearing field, parsed into a concrete timestamp by normalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "messageType", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(rename = "governedTaskId", skip_serializing_if = "Option::is_none")]
    pub governed_task_id: Option<String>,
    #[serde(rename = "planState", skip_serializing_if = "Option::is_none")]
    pub plan_state: Option<PlanState>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(rename = "requiresSelection", skip_serializing_if = "Option::is_none")]
    pub requires_selection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<IntegrationSelector>,
    /// Legacy alias for `requires_selection`
    #[serde(
        rename = "requiresIntegrationSelector",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_integration_selector: Option<bool>,
    /// Legacy alias for `selection`; takes precedence when both are present
    #[serde(
        rename = "integrationSelectorData",
        skip_serializing_if = "Option::is_none"
    )]
    pub integration_selector_data: Option<IntegrationSelector>,
    #[serde(rename = "formattedResult", skip_serializing_if = "Option::is_none")]
    pub formatted_result: Option<FormattedResult>,
    #[serde(
        rename = "mongodbIntegrationData",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongodb_integration_data: Option<serde_json::Value>,
    #[serde(
        rename = "mongodbSelectedViewType",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongodb_selected_view_type: Option<String>,
    #[serde(rename = "fileReference", skip_serializing_if = "Option::is_none")]
    pub file_reference: Option<serde_json::Value>,
    #[serde(rename = "providerViewLinks", skip_serializing_if = "Option::is_none")]
    pub provider_view_links: Option<serde_json::Value>,
}

/// Pre-shaped provider result carried by a raw message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResult {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    pub data: serde_json::Value,
}

/// Send-message response: the assistant message plus conversation bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(flatten)]
    pub message: RawMessage,
    #[serde(rename = "conversationId", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(rename = "totalCost", skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// Classification request body for `POST /chat/classify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClassifyMessageRequest {
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
}

/// Classifier verdict for `POST /chat/classify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyMessageResponse {
    #[serde(rename = "shouldUseGovernedAgent")]
    pub should_use_governed_agent: bool,
    pub classification: TaskClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Governed-task initiation request for `POST /chat/governed/initiate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InitiateTaskRequest {
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[serde(rename = "conversationId", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Task descriptor returned by governed-task initiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiateTaskResponse {
    #[serde(rename = "taskId")]
    pub task_id: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<TaskClassification>,
    pub status: String,
}

/// One SSE frame's decoded `data` payload.
///
/// The `type` discriminator routes each event to exactly one callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskStreamEvent {
    /// Informational; no state change
    Connected {
        #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },
    /// Carries a new plan state and/or partial plan content
    Update {
        #[serde(rename = "planState", skip_serializing_if = "Option::is_none")]
        plan_state: Option<PlanState>,
        #[serde(rename = "planContent", skip_serializing_if = "Option::is_none")]
        plan_content: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Terminal: the task reached DONE; the client closes the stream
    Complete {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
    },
    /// Terminal: the task failed; the client closes the stream
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl TaskStreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStreamEvent::Complete { .. } | TaskStreamEvent::Error { .. })
    }
}

/// One clarifying question raised during `CLARIFY`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyingQuestion {
    pub id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Response of `GET /governed-agent/{taskId}/clarify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifyResponse {
    #[serde(rename = "clarificationNeeded", default)]
    pub clarification_needed: Vec<ClarifyingQuestion>,
    #[serde(default)]
    pub ambiguities: Vec<String>,
    #[serde(rename = "hasClarifications", default)]
    pub has_clarifications: bool,
}

/// Request body of `POST /governed-agent/{taskId}/generate-plan`.
///
/// Omitting `clarifying_answers` accepts the defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratePlanRequest {
    #[serde(rename = "clarifyingAnswers", skip_serializing_if = "Option::is_none")]
    pub clarifying_answers: Option<HashMap<String, String>>,
}

/// Generated plan payload.
///
/// The plan-state advance to PLAN happens server-side and is observed via
/// the next SSE `update`, not through this response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    pub plan: serde_json::Value,
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Raw conversation payload as the server sends it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawConversation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "modelId", default)]
    pub model_id: String,
    #[serde(rename = "messageCount", default)]
    pub message_count: u32,
    /// Date-bearing field, parsed into a concrete timestamp by normalization
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "totalCost", skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "governedTasks", skip_serializing_if = "Option::is_none")]
    pub governed_tasks: Option<GovernedTasks>,
}

/// Conversation creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "modelId")]
    #[validate(length(min = 1, message = "Model id cannot be empty"))]
    pub model_id: String,
}

/// Conversation rename request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RenameConversationRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
}

/// Conversation list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationListResponse {
    #[serde(default)]
    pub conversations: Vec<RawConversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// Conversation history response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistoryResponse {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

/// Filtering query parameters for conversation listing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationFilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(rename = "modelId", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_stream_event_discriminates_on_type() {
        let update: TaskStreamEvent =
            serde_json::from_str(r#"{"type":"update","planState":"BUILD"}"#).unwrap();
        match update {
            TaskStreamEvent::Update { plan_state, .. } => {
                assert_eq!(plan_state, Some(PlanState::Build));
            }
            other => panic!("expected update, got {:?}", other),
        }

        let complete: TaskStreamEvent =
            serde_json::from_str(r#"{"type":"complete","message":"done"}"#).unwrap();
        assert!(complete.is_terminal());

        let connected: TaskStreamEvent = serde_json::from_str(r#"{"type":"connected"}"#).unwrap();
        assert!(!connected.is_terminal());
    }

    #[test]
    fn send_message_response_reads_flattened_message() {
        let json = r#"{
            "id": "m42",
            "role": "assistant",
            "content": "Here you go",
            "timestamp": "2026-08-20T10:00:00Z",
            "conversationId": "c7",
            "totalCost": 0.0042
        }"#;
        let response: SendMessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.id, "m42");
        assert_eq!(response.conversation_id.as_deref(), Some("c7"));
        assert_eq!(response.total_cost, Some(0.0042));
    }

    #[test]
    fn clarify_response_defaults_every_field() {
        // Backends omit hasClarifications (and sometimes the arrays) when
        // nothing needs clarifying.
        let response: ClarifyResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.has_clarifications);
        assert!(response.clarification_needed.is_empty());
        assert!(response.ambiguities.is_empty());

        let json = r#"{
            "clarificationNeeded": [{"id": "q1", "question": "Which database?"}],
            "hasClarifications": true
        }"#;
        let response: ClarifyResponse = serde_json::from_str(json).unwrap();
        assert!(response.has_clarifications);
        assert_eq!(response.clarification_needed.len(), 1);
    }

    #[test]
    fn send_message_request_skips_empty_optionals() {
        let request = SendMessageRequest::new("What is 2+2?", "gpt-4o-mini");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "What is 2+2?");
        assert!(json.get("attachments").is_none());
        assert!(json.get("selectionResponse").is_none());
    }
}
