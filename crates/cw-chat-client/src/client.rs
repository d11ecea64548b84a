// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main REST API client implementation

use cw_api_contract::*;
use cw_domain_types::{ChatMessage, Conversation};
use reqwest::{Client as HttpClient, Method, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{ChatClientError, ChatClientResult};
use crate::sse::{TaskEventStream, TaskProgressHandle};

// Large files and complex requests can take a while; anything past this
// surfaces as a Timeout with code ECONNABORTED.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// REST API client for the Costwise chat service
#[derive(Debug, Clone)]
pub struct ChatClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl ChatClient {
    /// Create a new chat client
    pub fn new(base_url: Url, auth: AuthConfig) -> Self {
        let http_client = HttpClient::builder()
            .user_agent("cw-chat/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url,
            auth,
        }
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig) -> ChatClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::new(base_url, auth))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the authentication config
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Classify a message into an execution route.
    ///
    /// Single round trip, no retry logic of its own; the caller decides.
    pub async fn classify(&self, message: &str) -> ChatClientResult<ClassifyMessageResponse> {
        let request = ClassifyMessageRequest {
            message: message.to_string(),
        };
        self.post("/chat/classify", &request).await
    }

    /// Send a chat message
    pub async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> ChatClientResult<SendMessageResponse> {
        self.post("/chat/message", request).await
    }

    /// Create a governed task server-side.
    ///
    /// Only meaningful after classification returned GOVERNED_WORKFLOW;
    /// calling it otherwise is a caller error and is not validated here.
    /// The returned task id seeds the SSE subscription.
    pub async fn initiate_governed_task(
        &self,
        request: &InitiateTaskRequest,
    ) -> ChatClientResult<InitiateTaskResponse> {
        self.post("/chat/governed/initiate", request).await
    }

    /// Stream governed-task progress via SSE.
    ///
    /// Never fails synchronously: connection failures are delivered
    /// through `on_error` like any other stream failure. Re-invoking with
    /// the same task id is the reconnection path; the server replays full
    /// current state on (re)connect.
    pub async fn stream_task_progress<U, C, E>(
        &self,
        task_id: &str,
        on_update: U,
        on_complete: C,
        on_error: E,
    ) -> TaskProgressHandle
    where
        U: Fn(TaskStreamEvent) + Send + 'static,
        C: Fn(TaskStreamEvent) + Send + 'static,
        E: Fn(String) + Send + 'static,
    {
        crate::sse::stream_task_progress(
            &self.base_url,
            task_id,
            &self.auth,
            on_update,
            on_complete,
            on_error,
        )
        .await
    }

    /// Open the raw task event stream (the subscription underlying
    /// [`Self::stream_task_progress`])
    pub async fn subscribe_task_events(&self, task_id: &str) -> ChatClientResult<TaskEventStream> {
        TaskEventStream::connect(&self.base_url, task_id, &self.auth).await
    }

    /// Fetch clarifying questions for a task in CLARIFY
    pub async fn get_clarifying_questions(&self, task_id: &str) -> ChatClientResult<ClarifyResponse> {
        let url = format!("/governed-agent/{}/clarify", task_id);
        self.get(&url).await
    }

    /// Submit clarifying answers (or accept defaults) and get the plan.
    ///
    /// The task advances to PLAN server-side; observe it via the next SSE
    /// update rather than assuming it when this call resolves.
    pub async fn generate_plan_with_answers(
        &self,
        task_id: &str,
        answers: Option<HashMap<String, String>>,
    ) -> ChatClientResult<GeneratePlanResponse> {
        let url = format!("/governed-agent/{}/generate-plan", task_id);
        let request = GeneratePlanRequest {
            clarifying_answers: answers,
        };
        self.post(&url, &request).await
    }

    /// Create a conversation
    pub async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> ChatClientResult<Conversation> {
        let raw: RawConversation = self.post("/chat/conversations", request).await?;
        Ok(normalize_conversation(raw))
    }

    /// List conversations with optional filtering
    pub async fn list_conversations(
        &self,
        filters: Option<&ConversationFilterQuery>,
    ) -> ChatClientResult<Vec<Conversation>> {
        let mut url = self.base_url.join("/chat/conversations")?;

        if let Some(filters) = filters {
            let query_params = self.build_query_params(filters);
            if !query_params.is_empty() {
                url.set_query(Some(&query_params));
            }
        }

        let response: ConversationListResponse = self.get(url.as_ref()).await?;
        Ok(response
            .conversations
            .into_iter()
            .map(normalize_conversation)
            .collect())
    }

    /// Fetch a conversation's message history, normalized
    pub async fn get_conversation_history(
        &self,
        conversation_id: &str,
    ) -> ChatClientResult<Vec<ChatMessage>> {
        let url = format!("/chat/conversations/{}/messages", conversation_id);
        let response: ConversationHistoryResponse = self.get(&url).await?;
        Ok(response.messages.into_iter().map(normalize_message).collect())
    }

    /// Rename a conversation
    pub async fn rename_conversation(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> ChatClientResult<()> {
        let url = format!("/chat/conversations/{}", conversation_id);
        let request = RenameConversationRequest {
            title: title.to_string(),
        };
        self.put(&url, &request).await
    }

    /// Pin or unpin a conversation
    pub async fn set_conversation_pinned(
        &self,
        conversation_id: &str,
        pinned: bool,
    ) -> ChatClientResult<()> {
        let url = format!("/chat/conversations/{}/pin", conversation_id);
        self.put(&url, &serde_json::json!({ "pinned": pinned })).await
    }

    /// Archive or unarchive a conversation
    pub async fn set_conversation_archived(
        &self,
        conversation_id: &str,
        archived: bool,
    ) -> ChatClientResult<()> {
        let url = format!("/chat/conversations/{}/archive", conversation_id);
        self.put(&url, &serde_json::json!({ "archived": archived })).await
    }

    /// Delete a conversation
    pub async fn delete_conversation(&self, conversation_id: &str) -> ChatClientResult<()> {
        let url = format!("/chat/conversations/{}", conversation_id);
        self.delete(&url).await
    }

    // Private helper methods

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ChatClientResult<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ChatClientResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ChatClientResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ChatClientResult<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ChatClientResult<T> {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            self.base_url.join(path)?.to_string()
        };

        let mut request = self.http_client.request(method, &url);

        let auth_headers = self.auth.headers()?;
        request = request.headers(auth_headers);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> ChatClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            // Empty bodies come back from the plain CRUD endpoints
            let text = if text.is_empty() { "null".to_string() } else { text };
            serde_json::from_str(&text).map_err(ChatClientError::from)
        } else {
            let text = response.text().await?;
            match serde_json::from_str::<ProblemDetails>(&text) {
                Ok(problem) => Err(ChatClientError::Server {
                    status,
                    details: problem,
                }),
                Err(_) => Err(ChatClientError::UnexpectedResponse(text)),
            }
        }
    }

    fn build_query_params<T: serde::Serialize>(&self, params: &T) -> String {
        let mut pairs = Vec::new();
        let value = serde_json::to_value(params).unwrap_or_default();

        if let serde_json::Value::Object(map) = value {
            for (key, val) in map {
                if !val.is_null() {
                    let val_str = match val {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::Bool(b) => b.to_string(),
                        _ => val.to_string().trim_matches('"').to_string(),
                    };
                    pairs.push(format!("{}={}", key, val_str));
                }
            }
        }

        pairs.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let base_url = "http://localhost:3001";
        let auth = AuthConfig::default();
        let client = ChatClient::from_url(base_url, auth).unwrap();

        assert_eq!(client.base_url().to_string(), format!("{}/", base_url));
    }

    #[test]
    fn test_query_params_building() {
        let client = ChatClient::from_url("http://localhost:3001", AuthConfig::default()).unwrap();

        let filters = ConversationFilterQuery {
            archived: Some(false),
            pinned: Some(true),
            model_id: None,
        };

        let params = client.build_query_params(&filters);
        assert!(params.contains("archived=false"));
        assert!(params.contains("pinned=true"));
        assert!(!params.contains("modelId"));
    }
}
