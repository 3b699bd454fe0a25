//! Data Commands
//!
//! JSON export and import of the whole document set.

use crate::repository::{self, ImportMode};
use crate::AppState;

/// Export `{ program, progress? }`, pretty-printed
pub async fn export_data(state: &AppState, include_progress: bool) -> Result<String, String> {
    let program = state.store.program().await;
    let result = if include_progress {
        let progress = state.store.progress().await;
        repository::export_json(&program, Some(&progress))
    } else {
        repository::export_json(&program, None)
    };
    result.map_err(|e| e.to_string())
}

/// Import a document, replacing or merging the local program
pub async fn import_data(state: &AppState, json: &str, mode: ImportMode) -> Result<(), String> {
    let bundle = repository::parse_import(json).map_err(|e| e.to_string())?;
    match mode {
        ImportMode::Replace => {
            state
                .store
                .save_program(bundle.program)
                .await
                .map_err(|e| e.to_string())?;
            if let Some(progress) = bundle.progress {
                state
                    .store
                    .save_progress(progress)
                    .await
                    .map_err(|e| e.to_string())?;
            }
        }
        ImportMode::Merge => {
            let local = state.store.program().await;
            let merged = repository::merge_programs(&local, &bundle.program);
            state
                .store
                .save_program(merged)
                .await
                .map_err(|e| e.to_string())?;
        }
    }
    state.notify_mutation().await;
    Ok(())
}
