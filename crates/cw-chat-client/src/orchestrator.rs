// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Message routing orchestrator
//!
//! Thin driver over the `ChatClientApi` seam implementing the submit
//! control flow: classify, then either send the message directly or
//! initiate a governed task. Direct responses come back normalized; a
//! governed outcome hands the caller the task descriptor to seed the SSE
//! subscription with.

use cw_api_contract::{
    normalize_message, InitiateTaskRequest, InitiateTaskResponse, SendMessageRequest,
};
use cw_client_api::{ChatClientApi, ClientApiError, ClientApiResult};
use cw_domain_types::{ChatMessage, IntegrationSelector, TaskClassification, TaskRoute};

use crate::error::ChatClientError;
use crate::selection::{build_selection_request, resolve_selection};

/// Outcome of submitting one user message
#[derive(Debug)]
pub enum RouteOutcome {
    /// Answered in one round trip; the message may still carry a selector
    Direct {
        message: ChatMessage,
        conversation_id: Option<String>,
    },
    /// A governed task was created; stream its progress by task id
    Governed {
        task: InitiateTaskResponse,
        classification: TaskClassification,
    },
}

/// Classify-then-route driver over any `ChatClientApi`
pub struct MessageOrchestrator<C> {
    api: C,
    model_id: String,
}

impl<C: ChatClientApi> MessageOrchestrator<C> {
    pub fn new(api: C, model_id: impl Into<String>) -> Self {
        Self {
            api,
            model_id: model_id.into(),
        }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// Submit a user message, routing on the classifier's verdict.
    pub async fn submit(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> ClientApiResult<RouteOutcome> {
        let verdict = self.api.classify(message).await?;

        match verdict.classification.route {
            TaskRoute::DirectExecution => {
                let mut request = SendMessageRequest::new(message, &self.model_id);
                request.conversation_id = conversation_id.map(str::to_string);
                let response = self.api.send_message(&request).await?;
                Ok(RouteOutcome::Direct {
                    message: normalize_message(response.message),
                    conversation_id: response.conversation_id,
                })
            }
            TaskRoute::GovernedWorkflow => {
                let request = InitiateTaskRequest {
                    message: message.to_string(),
                    conversation_id: conversation_id.map(str::to_string),
                };
                let task = self.api.initiate_governed_task(&request).await?;
                Ok(RouteOutcome::Governed {
                    task,
                    classification: verdict.classification,
                })
            }
        }
    }

    /// Answer a pending integration selector and resend through the
    /// send-message channel. Invalid custom values are rejected locally
    /// without any network call.
    pub async fn submit_selection(
        &self,
        selector: &IntegrationSelector,
        value: &str,
        conversation_id: Option<&str>,
    ) -> ClientApiResult<RouteOutcome> {
        let response = resolve_selection(selector, value).map_err(|err| match err {
            ChatClientError::Validation(msg) => ClientApiError::Validation(msg),
            other => ClientApiError::Server(other.to_string()),
        })?;

        let request = build_selection_request(selector, response, &self.model_id, conversation_id);
        let response = self.api.send_message(&request).await?;
        Ok(RouteOutcome::Direct {
            message: normalize_message(response.message),
            conversation_id: response.conversation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cw_api_contract::*;
    use cw_domain_types::{Complexity, RiskLevel, SelectorOption};
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        Api {}

        #[async_trait]
        impl ChatClientApi for Api {
            async fn classify(&self, message: &str) -> ClientApiResult<ClassifyMessageResponse>;
            async fn send_message(
                &self,
                request: &SendMessageRequest,
            ) -> ClientApiResult<SendMessageResponse>;
            async fn initiate_governed_task(
                &self,
                request: &InitiateTaskRequest,
            ) -> ClientApiResult<InitiateTaskResponse>;
            async fn get_clarifying_questions(&self, task_id: &str) -> ClientApiResult<ClarifyResponse>;
            async fn generate_plan_with_answers(
                &self,
                task_id: &str,
                request: &GeneratePlanRequest,
            ) -> ClientApiResult<GeneratePlanResponse>;
        }
    }

    fn verdict(route: TaskRoute) -> ClassifyMessageResponse {
        ClassifyMessageResponse {
            should_use_governed_agent: route == TaskRoute::GovernedWorkflow,
            classification: TaskClassification {
                task_type: "general".to_string(),
                integrations: vec![],
                complexity: Complexity::Low,
                risk_level: RiskLevel::None,
                requires_planning: route == TaskRoute::GovernedWorkflow,
                route,
                reasoning: "test".to_string(),
                estimated_duration: None,
            },
            reason: None,
        }
    }

    fn assistant_reply(content: &str) -> SendMessageResponse {
        SendMessageResponse {
            message: RawMessage {
                id: "m1".to_string(),
                content: content.to_string(),
                timestamp: Some("2026-08-20T10:00:00Z".to_string()),
                ..Default::default()
            },
            conversation_id: Some("c1".to_string()),
            total_cost: None,
        }
    }

    #[tokio::test]
    async fn direct_route_sends_once_and_never_initiates() {
        let mut api = MockApi::new();
        api.expect_classify()
            .with(eq("What is 2+2?"))
            .times(1)
            .returning(|_| Ok(verdict(TaskRoute::DirectExecution)));
        api.expect_send_message()
            .times(1)
            .returning(|_| Ok(assistant_reply("4")));
        api.expect_initiate_governed_task().times(0);

        let orchestrator = MessageOrchestrator::new(api, "gpt-4o-mini");
        let outcome = orchestrator.submit("What is 2+2?", None).await.unwrap();

        match outcome {
            RouteOutcome::Direct { message, conversation_id } => {
                assert_eq!(message.content, "4");
                assert_eq!(conversation_id.as_deref(), Some("c1"));
                assert!(!message.requires_selection);
            }
            other => panic!("expected direct outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn governed_route_initiates_and_never_sends() {
        let mut api = MockApi::new();
        api.expect_classify()
            .times(1)
            .returning(|_| Ok(verdict(TaskRoute::GovernedWorkflow)));
        api.expect_send_message().times(0);
        api.expect_initiate_governed_task()
            .withf(|req| req.message == "Migrate the orders collection")
            .times(1)
            .returning(|_| {
                Ok(InitiateTaskResponse {
                    task_id: "t1".to_string(),
                    mode: "governed".to_string(),
                    classification: None,
                    status: "created".to_string(),
                })
            });

        let orchestrator = MessageOrchestrator::new(api, "gpt-4o-mini");
        let outcome = orchestrator
            .submit("Migrate the orders collection", Some("c1"))
            .await
            .unwrap();

        match outcome {
            RouteOutcome::Governed { task, classification } => {
                assert_eq!(task.task_id, "t1");
                assert_eq!(classification.route, TaskRoute::GovernedWorkflow);
            }
            other => panic!("expected governed outcome, got {:?}", other),
        }
    }

    fn repo_selector() -> IntegrationSelector {
        IntegrationSelector {
            parameter_name: "repository".to_string(),
            question: "Which repository?".to_string(),
            options: vec![
                SelectorOption {
                    id: "a".to_string(),
                    label: "Repo A".to_string(),
                    value: "repo-a".to_string(),
                    description: None,
                    icon: None,
                },
                SelectorOption {
                    id: "b".to_string(),
                    label: "Repo B".to_string(),
                    value: "repo-b".to_string(),
                    description: None,
                    icon: None,
                },
            ],
            allow_custom: false,
            custom_placeholder: None,
            integration: Some("github".to_string()),
            pending_action: None,
            collected_params: [("org".to_string(), serde_json::json!("acme"))]
                .into_iter()
                .collect(),
            original_message: Some("Open a PR".to_string()),
        }
    }

    #[tokio::test]
    async fn invalid_custom_selection_is_rejected_without_a_network_call() {
        let mut api = MockApi::new();
        api.expect_send_message().times(0);

        let orchestrator = MessageOrchestrator::new(api, "gpt-4o-mini");
        let err = orchestrator
            .submit_selection(&repo_selector(), "repo-c", Some("c1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientApiError::Validation(_)));
    }

    #[tokio::test]
    async fn accepted_selection_round_trips_with_accumulated_params() {
        let mut api = MockApi::new();
        api.expect_send_message()
            .withf(|req| {
                let selection = req.selection_response.as_ref().unwrap();
                selection.value == "repo-a"
                    && selection.collected_params["org"] == "acme"
                    && selection.collected_params["repository"] == "repo-a"
            })
            .times(1)
            .returning(|_| Ok(assistant_reply("PR opened")));

        let orchestrator = MessageOrchestrator::new(api, "gpt-4o-mini");
        let outcome = orchestrator
            .submit_selection(&repo_selector(), "repo-a", Some("c1"))
            .await
            .unwrap();

        match outcome {
            RouteOutcome::Direct { message, .. } => assert_eq!(message.content, "PR opened"),
            other => panic!("expected direct outcome, got {:?}", other),
        }
    }
}
