//! Schedule Commands
//!
//! Read-only queries: what is due on a date, what a walkthrough should
//! present, what references an item, and the editor's reconstructed
//! schedule for legacy-only items.

use chrono::NaiveDate;

use crate::domain::schedule::{self, DaySchedule};
use crate::domain::validation::{self, ItemDependencies};
use crate::domain::{ItemSchedule, Slot};
use crate::AppState;

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", date))
}

/// Today's date as "YYYY-MM-DD" in local time
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Due item ids for one date and slot
pub async fn items_for_slot(state: &AppState, date: &str, slot: Slot) -> Result<Vec<String>, String> {
    let date = parse_date(date)?;
    Ok(schedule::due_items(&state.store.program().await, date, slot))
}

/// Due item ids for every slot of a date
pub async fn items_for_date(state: &AppState, date: &str) -> Result<DaySchedule, String> {
    let date = parse_date(date)?;
    Ok(schedule::due_items_for_date(&state.store.program().await, date))
}

/// Due items minus disabled items and completed one-offs
pub async fn pending_items_for_slot(
    state: &AppState,
    date: &str,
    slot: Slot,
) -> Result<Vec<String>, String> {
    let date = parse_date(date)?;
    let program = state.store.program().await;
    let progress = state.store.progress().await;
    let due = schedule::due_items(&program, date, slot);
    Ok(schedule::pending_items(&program, &progress, &due))
}

/// Which playlists and rules reference an item; shown before deletion
pub async fn item_dependencies(state: &AppState, item_id: &str) -> ItemDependencies {
    validation::find_item_dependencies(item_id, &state.store.program().await)
}

/// Reconstructed schedule for prefilling the item editor
pub async fn schedule_for_editor(state: &AppState, item_id: &str) -> ItemSchedule {
    let today = chrono::Local::now().date_naive();
    validation::extract_item_schedule(item_id, &state.store.program().await, today)
}
