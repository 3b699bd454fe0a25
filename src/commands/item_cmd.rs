//! Item Commands
//!
//! Create, update, and delete items, plus settings updates. Every
//! mutation validates first, persists synchronously, then nudges the
//! sync debouncer.

use crate::domain::{mutate, validation, Item, ItemPatch, Settings, SettingsPatch};
use crate::AppState;

/// Create a new item. Unlike edits, a colliding id is an error here;
/// ids are immutable once created.
pub async fn create_item(state: &AppState, item: Item) -> Result<(), String> {
    let program = state.store.program().await;
    let existing = program.item_ids();

    let mut errors = validation::validate_item(&item, &existing);
    if program.items.contains_key(&item.id) {
        errors.push("Item ID already exists".to_string());
    }
    if !errors.is_empty() {
        return Err(errors.join("; "));
    }

    let next = mutate::add_item(&program, item);
    state.store.save_program(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Patch an existing item
pub async fn update_item(state: &AppState, item_id: &str, patch: ItemPatch) -> Result<(), String> {
    let program = state.store.program().await;
    let next = mutate::update_item(&program, item_id, &patch).map_err(|e| e.to_string())?;

    if let Some(updated) = next.items.get(item_id) {
        let errors = validation::validate_item(updated, &program.item_ids());
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }
    }

    state.store.save_program(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Delete an item and every reference to it
pub async fn delete_item(state: &AppState, item_id: &str) -> Result<(), String> {
    let program = state.store.program().await;
    let next = mutate::delete_item(&program, item_id).map_err(|e| e.to_string())?;
    state.store.save_program(next).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Fetch one item
pub async fn get_item(state: &AppState, item_id: &str) -> Option<Item> {
    state.store.program().await.items.get(item_id).cloned()
}

/// All items in id order
pub async fn list_items(state: &AppState) -> Vec<Item> {
    state.store.program().await.items.values().cloned().collect()
}

/// Apply a partial settings update
pub async fn update_settings(state: &AppState, patch: SettingsPatch) -> Result<(), String> {
    let mut program = state.store.program().await;
    patch.apply_to(&mut program.settings);
    state.store.save_program(program).await.map_err(|e| e.to_string())?;
    state.notify_mutation().await;
    Ok(())
}

/// Current settings snapshot
pub async fn get_settings(state: &AppState) -> Settings {
    state.store.program().await.settings
}
