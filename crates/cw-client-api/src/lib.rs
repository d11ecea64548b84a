// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client-facing API traits for the Costwise chat service
//!
//! These traits are the seam between orchestration logic and transports:
//! the production REST client implements them, and tests substitute mocks
//! or channel-backed fakes. `TaskEventSource` models the SSE subscription
//! as a generic capability so implementations may back it with native SSE,
//! WebSockets, or a polling adapter.

use async_trait::async_trait;
use cw_api_contract::{
    ClarifyResponse, ClassifyMessageResponse, GeneratePlanRequest, GeneratePlanResponse,
    InitiateTaskRequest, InitiateTaskResponse, SendMessageRequest, SendMessageResponse,
    TaskStreamEvent,
};
use futures::stream::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced through the client API seam
#[derive(Debug, Error)]
pub enum ClientApiError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

/// A cancellable, ordered, finite-until-terminal sequence of task events
pub type BoxedTaskEventStream =
    Pin<Box<dyn Stream<Item = Result<TaskStreamEvent, ClientApiError>> + Send>>;

/// Request/response operations of the chat service
#[async_trait]
pub trait ChatClientApi: Send + Sync {
    /// Classify a message into an execution route
    async fn classify(&self, message: &str) -> ClientApiResult<ClassifyMessageResponse>;

    /// Send a chat message (direct execution or selector round trip)
    async fn send_message(
        &self,
        request: &SendMessageRequest,
    ) -> ClientApiResult<SendMessageResponse>;

    /// Create a governed task server-side.
    ///
    /// Precondition: classification returned GOVERNED_WORKFLOW. Calling it
    /// otherwise is a caller error and is not validated here.
    async fn initiate_governed_task(
        &self,
        request: &InitiateTaskRequest,
    ) -> ClientApiResult<InitiateTaskResponse>;

    /// Read-only query for clarifying questions; callable during CLARIFY
    async fn get_clarifying_questions(&self, task_id: &str) -> ClientApiResult<ClarifyResponse>;

    /// Submit clarifying answers (or accept defaults) and get the plan.
    ///
    /// The plan-state advance to PLAN is observed via the next streamed
    /// update, never assumed locally when this call resolves.
    async fn generate_plan_with_answers(
        &self,
        task_id: &str,
        request: &GeneratePlanRequest,
    ) -> ClientApiResult<GeneratePlanResponse>;
}

/// Subscription capability for governed-task progress events
#[async_trait]
pub trait TaskEventSource: Send + Sync {
    /// Open one ordered event stream for a task.
    ///
    /// At most one subscription per task should be open at a time; the
    /// implementation does not guard against a second one.
    async fn subscribe(&self, task_id: &str) -> ClientApiResult<BoxedTaskEventStream>;
}
