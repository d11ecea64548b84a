// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Conversation records and time-bucket partitioning

use chrono::{DateTime, Days, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Governed-task bookkeeping for a conversation.
///
/// At most one governed task is active per conversation; `active` refers
/// to a task whose terminal state has not yet been observed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GovernedTasks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

/// Normalized conversation summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(rename = "modelId")]
    pub model_id: String,
    #[serde(rename = "messageCount")]
    pub message_count: u32,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "totalCost", skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(rename = "governedTasks", skip_serializing_if = "Option::is_none")]
    pub governed_tasks: Option<GovernedTasks>,
}

/// Conversations partitioned by recency, newest bucket first.
///
/// Every conversation lands in exactly one bucket; order within a bucket
/// is the input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationBuckets {
    pub today: Vec<Conversation>,
    pub yesterday: Vec<Conversation>,
    pub seven_days: Vec<Conversation>,
    pub thirty_days: Vec<Conversation>,
    pub earlier: Vec<Conversation>,
}

impl ConversationBuckets {
    pub fn len(&self) -> usize {
        self.today.len()
            + self.yesterday.len()
            + self.seven_days.len()
            + self.thirty_days.len()
            + self.earlier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition conversations by `updated_at`, anchored at *local* midnight.
///
/// Boundaries: today = `updated_at >= today_start`; yesterday =
/// `[yesterday_start, today_start)`; seven days =
/// `[seven_days_ago, yesterday_start)`; thirty days =
/// `[thirty_days_ago, seven_days_ago)`; earlier = everything older.
pub fn categorize_conversations_by_time(conversations: Vec<Conversation>) -> ConversationBuckets {
    let today_start = local_midnight(Local::now());
    categorize_with_anchor(conversations, today_start)
}

// Split out so tests can pin the anchor instead of racing the wall clock.
fn categorize_with_anchor(
    conversations: Vec<Conversation>,
    today_start: NaiveDateTime,
) -> ConversationBuckets {
    let yesterday_start = today_start - Days::new(1);
    let seven_days_start = today_start - Days::new(7);
    let thirty_days_start = today_start - Days::new(30);

    let mut buckets = ConversationBuckets::default();
    for conversation in conversations {
        let local = conversation.updated_at.with_timezone(&Local).naive_local();
        if local >= today_start {
            buckets.today.push(conversation);
        } else if local >= yesterday_start {
            buckets.yesterday.push(conversation);
        } else if local >= seven_days_start {
            buckets.seven_days.push(conversation);
        } else if local >= thirty_days_start {
            buckets.thirty_days.push(conversation);
        } else {
            buckets.earlier.push(conversation);
        }
    }
    buckets
}

fn local_midnight(now: DateTime<Local>) -> NaiveDateTime {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
}
