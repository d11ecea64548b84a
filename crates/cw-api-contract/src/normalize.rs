// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The normalization boundary between wire payloads and domain records.
//!
//! This is the single place where partial and legacy payload shapes are
//! reconciled: the `integrationSelectorData` alias, the
//! `requiresIntegrationSelector` alias, and the provider-result fallback
//! chain all resolve here so that nothing downstream has to know the old
//! field names.

use chrono::{DateTime, Utc};
use cw_domain_types::{
    ChatMessage, Conversation, MessageAttachment, MessageRole, ProviderResult, ProviderViewType,
};

use crate::types::{RawConversation, RawMessage};

/// Normalize a raw wire message into a domain `ChatMessage`.
///
/// Guarantees a concrete `timestamp` (falling back to now when the raw
/// field is absent or unparsable). Legacy `integrationSelectorData` wins
/// over a modern `selection` field when both exist, and its presence
/// forces `requires_selection` true.
pub fn normalize_message(raw: RawMessage) -> ChatMessage {
    let timestamp = parse_timestamp(raw.timestamp.as_deref());

    let has_legacy_selector = raw.integration_selector_data.is_some();
    let selection = raw.integration_selector_data.or(raw.selection);
    let requires_selection = has_legacy_selector
        || raw.requires_selection.unwrap_or(false)
        || raw.requires_integration_selector.unwrap_or(false);

    // Provider-result fallback chain: formattedResult wins, then the raw
    // integration metadata with the selected view type (default table).
    let mongodb_result = if let Some(formatted) = raw.formatted_result {
        Some(ProviderResult {
            view_type: formatted
                .result_type
                .map(ProviderViewType::from)
                .unwrap_or_default(),
            data: formatted.data,
            integration: raw.mongodb_integration_data,
        })
    } else if let Some(integration_data) = raw.mongodb_integration_data {
        Some(ProviderResult {
            view_type: raw
                .mongodb_selected_view_type
                .clone()
                .map(ProviderViewType::from)
                .unwrap_or_default(),
            data: integration_data,
            integration: None,
        })
    } else {
        None
    };

    ChatMessage {
        id: raw.id,
        role: raw.role.unwrap_or(MessageRole::Assistant),
        content: raw.content,
        timestamp,
        message_type: raw.message_type,
        governed_task_id: raw.governed_task_id,
        plan_state: raw.plan_state,
        attachments: dedupe_attachments(raw.attachments),
        requires_selection,
        selection,
        mongodb_result,
        mongodb_selected_view_type: raw.mongodb_selected_view_type,
        file_reference: raw.file_reference,
        provider_view_links: raw.provider_view_links,
    }
}

/// Normalize a raw conversation: dates become concrete timestamps, all
/// other fields pass through untouched.
pub fn normalize_conversation(raw: RawConversation) -> Conversation {
    Conversation {
        id: raw.id,
        title: raw.title,
        model_id: raw.model_id,
        message_count: raw.message_count,
        updated_at: parse_timestamp(raw.updated_at.as_deref()),
        total_cost: raw.total_cost,
        pinned: raw.pinned,
        archived: raw.archived,
        governed_tasks: raw.governed_tasks,
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    match raw {
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(err) => {
                tracing::debug!(raw = s, %err, "unparsable timestamp, using now");
                Utc::now()
            }
        },
        None => Utc::now(),
    }
}

// file_id is unique within one message's attachment list; keep the first
// occurrence when the server repeats one.
fn dedupe_attachments(attachments: Vec<MessageAttachment>) -> Vec<MessageAttachment> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        if seen.insert(attachment.file_id.clone()) {
            out.push(attachment);
        } else {
            tracing::warn!(file_id = %attachment.file_id, "duplicate attachment fileId dropped");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormattedResult;
    use cw_domain_types::{AttachmentKind, IntegrationSelector, MessageType, PlanState};

    fn raw_selector(parameter_name: &str) -> IntegrationSelector {
        IntegrationSelector {
            parameter_name: parameter_name.to_string(),
            question: "Which one?".to_string(),
            options: vec![],
            allow_custom: true,
            custom_placeholder: None,
            integration: None,
            pending_action: None,
            collected_params: Default::default(),
            original_message: None,
        }
    }

    #[test]
    fn legacy_selector_data_takes_precedence_and_forces_requires_selection() {
        let raw = RawMessage {
            id: "m1".to_string(),
            content: "pick".to_string(),
            selection: Some(raw_selector("modern")),
            integration_selector_data: Some(raw_selector("legacy")),
            requires_selection: Some(false),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        assert!(msg.requires_selection);
        assert_eq!(msg.selection.unwrap().parameter_name, "legacy");
    }

    #[test]
    fn legacy_requires_flag_is_honored() {
        let raw = RawMessage {
            requires_integration_selector: Some(true),
            selection: Some(raw_selector("modern")),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        assert!(msg.requires_selection);
        assert_eq!(msg.selection.unwrap().parameter_name, "modern");
    }

    #[test]
    fn formatted_result_wins_the_fallback_chain() {
        let raw = RawMessage {
            formatted_result: Some(FormattedResult {
                result_type: Some("chart".to_string()),
                data: serde_json::json!({"series": [1, 2, 3]}),
            }),
            mongodb_integration_data: Some(serde_json::json!({"collection": "orders"})),
            mongodb_selected_view_type: Some("json".to_string()),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        let result = msg.mongodb_result.unwrap();
        assert_eq!(result.view_type, ProviderViewType::Chart);
        assert_eq!(result.data["series"][0], 1);
        assert_eq!(result.integration.unwrap()["collection"], "orders");
    }

    #[test]
    fn integration_data_falls_back_with_selected_view_type() {
        let raw = RawMessage {
            mongodb_integration_data: Some(serde_json::json!({"rows": 10})),
            mongodb_selected_view_type: Some("stats".to_string()),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        let result = msg.mongodb_result.unwrap();
        assert_eq!(result.view_type, ProviderViewType::Stats);
        assert_eq!(result.data["rows"], 10);
        assert!(result.integration.is_none());
    }

    #[test]
    fn integration_data_defaults_to_table_view() {
        let raw = RawMessage {
            mongodb_integration_data: Some(serde_json::json!({"rows": 10})),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        assert_eq!(msg.mongodb_result.unwrap().view_type, ProviderViewType::Table);
    }

    #[test]
    fn no_provider_payloads_means_no_result_wrapper() {
        let msg = normalize_message(RawMessage::default());
        assert!(msg.mongodb_result.is_none());
    }

    #[test]
    fn timestamp_parses_and_falls_back() {
        let raw = RawMessage {
            timestamp: Some("2026-08-20T10:30:00Z".to_string()),
            ..Default::default()
        };
        let msg = normalize_message(raw);
        assert_eq!(msg.timestamp.to_rfc3339(), "2026-08-20T10:30:00+00:00");

        let before = Utc::now();
        let fallback = normalize_message(RawMessage {
            timestamp: Some("not-a-date".to_string()),
            ..Default::default()
        });
        assert!(fallback.timestamp >= before);
    }

    #[test]
    fn governed_fields_pass_through_verbatim() {
        let raw = RawMessage {
            message_type: Some(MessageType::GovernedPlan),
            governed_task_id: Some("t1".to_string()),
            plan_state: Some(PlanState::Clarify),
            ..Default::default()
        };

        let msg = normalize_message(raw);

        assert!(msg.is_governed_plan());
        assert!(msg.plan_invariant_holds());
        assert_eq!(msg.plan_state, Some(PlanState::Clarify));
    }

    #[test]
    fn duplicate_attachment_ids_keep_first() {
        let att = |id: &str, name: &str| MessageAttachment {
            kind: AttachmentKind::Uploaded,
            file_id: id.to_string(),
            file_name: name.to_string(),
            file_size: 1,
            mime_type: "text/plain".to_string(),
            file_type: "Text".to_string(),
            url: String::new(),
            extracted_text: None,
            extracted_at: None,
        };
        let raw = RawMessage {
            attachments: vec![att("f1", "first.txt"), att("f2", "other.txt"), att("f1", "dup.txt")],
            ..Default::default()
        };

        let msg = normalize_message(raw);

        assert_eq!(msg.attachments.len(), 2);
        assert_eq!(msg.attachments[0].file_name, "first.txt");
    }

    #[test]
    fn conversation_dates_become_timestamps() {
        let raw = RawConversation {
            id: "c1".to_string(),
            title: "Budget review".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            message_count: 5,
            updated_at: Some("2026-08-19T08:00:00Z".to_string()),
            total_cost: Some(0.12),
            ..Default::default()
        };

        let conversation = normalize_conversation(raw);

        assert_eq!(conversation.updated_at.to_rfc3339(), "2026-08-19T08:00:00+00:00");
        assert_eq!(conversation.total_cost, Some(0.12));
        assert_eq!(conversation.message_count, 5);
    }
}
