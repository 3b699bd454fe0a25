//! Progress Commands
//!
//! Session and completion recording plus the one-off reset.

use chrono::Utc;

use crate::domain::{ledger, Slot};
use crate::AppState;

/// Record a finished walkthrough session
pub async fn record_session(
    state: &AppState,
    slot: Slot,
    date: &str,
    items_completed: u32,
    total_items: u32,
) -> Result<(), String> {
    let progress = state.store.progress().await;
    let next = ledger::record_session(&progress, slot, date, items_completed, total_items, Utc::now());
    state.store.save_progress(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Record one item done during a walkthrough
pub async fn record_item_completion(
    state: &AppState,
    item_id: &str,
    slot: Slot,
    date: &str,
) -> Result<(), String> {
    let progress = state.store.progress().await;
    let next = ledger::record_item_completion(&progress, item_id, slot, date, Utc::now());
    state.store.save_progress(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Whether a one-off item is currently suppressed
pub async fn is_item_completed(state: &AppState, item_id: &str) -> bool {
    let program = state.store.program().await;
    let progress = state.store.progress().await;
    ledger::is_item_completed(&progress, &program, item_id)
}

/// Clear one-off suppression for every item
pub async fn reset_one_offs(state: &AppState) -> Result<(), String> {
    let program = state.store.program().await;
    let progress = state.store.progress().await;
    let next = ledger::reset_one_offs(&progress, &program);
    state.store.save_progress(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}
