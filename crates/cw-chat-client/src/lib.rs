// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST + SSE client for the Costwise conversation and governed-task
//! service
//!
//! This crate provides the complete HTTP client for the chat API: direct
//! message sending, route classification, governed-task initiation and
//! SSE progress streaming, the selection/clarification resolver, and the
//! classify-then-route orchestrator.
//!
//! ## Design Principles
//!
//! The client is a thin, predictable state carrier: it performs no
//! retries and owns no global state — the credential is threaded in
//! explicitly, and each call site tracks its own task-id-to-handle
//! mapping. It implements the `ChatClientApi` and `TaskEventSource`
//! traits for compatibility with mocks and alternative transports.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod selection;
pub mod sse;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use orchestrator::*;
pub use selection::*;
pub use sse::{TaskEventStream, TaskProgressHandle};

use async_trait::async_trait;
use cw_api_contract::*;
use cw_client_api::{
    BoxedTaskEventStream, ChatClientApi, ClientApiError, ClientApiResult, TaskEventSource,
};
use futures::StreamExt;

#[async_trait]
impl ChatClientApi for client::ChatClient {
    async fn classify(&self, message: &str) -> ClientApiResult<ClassifyMessageResponse> {
        self.classify(message)
            .await
            .map_err(|e| ClientApiError::Server(e.to_string()))
    }

    async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> ClientApiResult<SendMessageResponse> {
        self.send_message(request)
            .await
            .map_err(|e| ClientApiError::Server(e.to_string()))
    }

    async fn initiate_governed_task(
        &self,
        request: &InitiateTaskRequest,
    ) -> ClientApiResult<InitiateTaskResponse> {
        self.initiate_governed_task(request)
            .await
            .map_err(|e| ClientApiError::Server(e.to_string()))
    }

    async fn get_clarifying_questions(&self, task_id: &str) -> ClientApiResult<ClarifyResponse> {
        self.get_clarifying_questions(task_id)
            .await
            .map_err(|e| ClientApiError::Server(e.to_string()))
    }

    async fn generate_plan_with_answers(
        &self,
        task_id: &str,
        request: &GeneratePlanRequest,
    ) -> ClientApiResult<GeneratePlanResponse> {
        self.generate_plan_with_answers(task_id, request.clarifying_answers.clone())
            .await
            .map_err(|e| ClientApiError::Server(e.to_string()))
    }
}

#[async_trait]
impl TaskEventSource for client::ChatClient {
    async fn subscribe(&self, task_id: &str) -> ClientApiResult<BoxedTaskEventStream> {
        let stream = self
            .subscribe_task_events(task_id)
            .await
            .map_err(|e| ClientApiError::Stream(e.to_string()))?;
        Ok(Box::pin(stream.map(|item| {
            item.map_err(|e| ClientApiError::Stream(e.to_string()))
        })))
    }
}
