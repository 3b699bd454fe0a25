//! Progress Document
//!
//! Append-only session and item-completion logs. Never validated beyond
//! presence; the only destructive operation is the one-off reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slot::Slot;

/// One guided walkthrough of a slot's items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub slot: Slot,
    /// Calendar date the session was for, "YYYY-MM-DD"
    pub date: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub items_completed: u32,
    pub total_items: u32,
}

/// A single item marked done during a walkthrough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCompletion {
    pub item_id: String,
    pub slot: Slot,
    pub date: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub item_completions: Vec<ItemCompletion>,
}
