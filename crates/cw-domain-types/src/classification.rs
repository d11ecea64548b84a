// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Task classification records
//!
//! A classification is produced once per user message by the backend
//! classifier and never mutated afterwards. The `route` field decides
//! whether the message is answered directly or handed to the governed
//! task controller.

use serde::{Deserialize, Serialize};

/// Execution route for a classified message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskRoute {
    #[serde(rename = "DIRECT_EXECUTION")]
    DirectExecution,
    #[serde(rename = "GOVERNED_WORKFLOW")]
    GovernedWorkflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Classifier verdict for one user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskClassification {
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub integrations: Vec<String>,
    pub complexity: Complexity,
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    #[serde(rename = "requiresPlanning")]
    pub requires_planning: bool,
    pub route: TaskRoute,
    pub reasoning: String,
    #[serde(rename = "estimatedDuration", skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
}
