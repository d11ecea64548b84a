// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Chat message domain records
//!
//! A `ChatMessage` is the normalized record produced from a wire payload.
//! Governed-plan messages additionally carry a task id and a plan state
//! that is mutated in place as SSE updates arrive for the same task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::MessageAttachment;
use crate::selector::IntegrationSelector;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Discriminates ordinary messages from governed-plan carriers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    Assistant,
    System,
    GovernedPlan,
}

/// Plan states of a governed task.
///
/// Transitions are driven exclusively by inbound SSE events; the client
/// never advances state on its own. `Done` is terminal; stream errors put
/// the task in an implicit error state that is equally terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanState {
    Scope,
    Clarify,
    Plan,
    Build,
    Verify,
    Done,
}

impl PlanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanState::Done)
    }
}

/// View types for provider result payloads.
///
/// Unknown tags are preserved verbatim in `Other` rather than rejected,
/// since providers may add view types ahead of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderViewType {
    Table,
    Json,
    Schema,
    Stats,
    Chart,
    Text,
    Error,
    Empty,
    Explain,
    Other(String),
}

impl ProviderViewType {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderViewType::Table => "table",
            ProviderViewType::Json => "json",
            ProviderViewType::Schema => "schema",
            ProviderViewType::Stats => "stats",
            ProviderViewType::Chart => "chart",
            ProviderViewType::Text => "text",
            ProviderViewType::Error => "error",
            ProviderViewType::Empty => "empty",
            ProviderViewType::Explain => "explain",
            ProviderViewType::Other(s) => s,
        }
    }
}

impl From<String> for ProviderViewType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "table" => ProviderViewType::Table,
            "json" => ProviderViewType::Json,
            "schema" => ProviderViewType::Schema,
            "stats" => ProviderViewType::Stats,
            "chart" => ProviderViewType::Chart,
            "text" => ProviderViewType::Text,
            "error" => ProviderViewType::Error,
            "empty" => ProviderViewType::Empty,
            "explain" => ProviderViewType::Explain,
            _ => ProviderViewType::Other(s),
        }
    }
}

impl From<ProviderViewType> for String {
    fn from(v: ProviderViewType) -> Self {
        v.as_str().to_string()
    }
}

impl Default for ProviderViewType {
    fn default() -> Self {
        ProviderViewType::Table
    }
}

/// Reconciled provider result attached to an assistant message.
///
/// `data` is deliberately opaque: the known view types describe how to
/// render it, not its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    #[serde(rename = "type")]
    pub view_type: ProviderViewType,
    pub data: serde_json::Value,
    /// Sibling integration metadata carried next to a formatted result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<serde_json::Value>,
}

/// Normalized chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "messageType", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(rename = "governedTaskId", skip_serializing_if = "Option::is_none")]
    pub governed_task_id: Option<String>,
    #[serde(rename = "planState", skip_serializing_if = "Option::is_none")]
    pub plan_state: Option<PlanState>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(rename = "requiresSelection", default)]
    pub requires_selection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<IntegrationSelector>,
    #[serde(rename = "mongodbResult", skip_serializing_if = "Option::is_none")]
    pub mongodb_result: Option<ProviderResult>,
    /// Opaque render hints passed through unchanged
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

impl ChatMessage {
    pub fn is_governed_plan(&self) -> bool {
        self.message_type == Some(MessageType::GovernedPlan)
    }

    /// Governed-plan messages must carry both a task id and a plan state.
    pub fn plan_invariant_holds(&self) -> bool {
        !self.is_governed_plan()
            || (self.governed_task_id.is_some() && self.plan_state.is_some())
    }

    /// Apply a streamed plan-state update in place.
    pub fn apply_plan_state(&mut self, state: PlanState) {
        self.plan_state = Some(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governed_message() -> ChatMessage {
        ChatMessage {
            id: "m1".to_string(),
            role: MessageRole::Assistant,
            content: "Working on it".to_string(),
            timestamp: Utc::now(),
            message_type: Some(MessageType::GovernedPlan),
            governed_task_id: Some("t1".to_string()),
            plan_state: Some(PlanState::Scope),
            attachments: vec![],
            requires_selection: false,
            selection: None,
            mongodb_result: None,
            mongodb_selected_view_type: None,
            file_reference: None,
            provider_view_links: None,
        }
    }

    #[test]
    fn plan_state_serde_uses_screaming_case() {
        assert_eq!(
            serde_json::to_string(&PlanState::Clarify).unwrap(),
            "\"CLARIFY\""
        );
        let parsed: PlanState = serde_json::from_str("\"VERIFY\"").unwrap();
        assert_eq!(parsed, PlanState::Verify);
    }

    #[test]
    fn governed_plan_invariant() {
        let mut msg = governed_message();
        assert!(msg.plan_invariant_holds());

        msg.plan_state = None;
        assert!(!msg.plan_invariant_holds());

        msg.message_type = Some(MessageType::Assistant);
        assert!(msg.plan_invariant_holds());
    }

    #[test]
    fn plan_state_updates_in_place() {
        let mut msg = governed_message();
        msg.apply_plan_state(PlanState::Build);
        assert_eq!(msg.plan_state, Some(PlanState::Build));
        assert!(!msg.plan_state.unwrap().is_terminal());

        msg.apply_plan_state(PlanState::Done);
        assert!(msg.plan_state.unwrap().is_terminal());
    }

    #[test]
    fn provider_view_type_preserves_unknown_tags() {
        let parsed: ProviderViewType = serde_json::from_str("\"heatmap\"").unwrap();
        assert_eq!(parsed, ProviderViewType::Other("heatmap".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"heatmap\"");

        let known: ProviderViewType = serde_json::from_str("\"stats\"").unwrap();
        assert_eq!(known, ProviderViewType::Stats);
    }
}
