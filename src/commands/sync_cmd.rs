//! Cloud Sync Commands
//!
//! Connect/disconnect the Drive mirror, trigger uploads, and pull the
//! remote copy over the local one.

use std::sync::Arc;

use crate::sync::{DriveClient, SyncReport};
use crate::AppState;

/// Attach a Drive client using a bearer token from the consent flow
pub async fn connect_drive(
    state: &AppState,
    access_token: &str,
    file_name: Option<String>,
) -> Result<SyncReport, String> {
    let client = Arc::new(DriveClient::new(access_token));
    state
        .sync
        .connect(client, file_name)
        .await
        .map_err(|e| e.to_string())?;
    Ok(state.sync.status().await)
}

pub async fn disconnect_drive(state: &AppState) {
    state.sync.disconnect().await;
}

pub async fn sync_status(state: &AppState) -> SyncReport {
    state.sync.status().await
}

/// Upload the local documents right now, skipping the debounce
pub async fn sync_to_drive_now(state: &AppState) -> Result<(), String> {
    state.sync.sync_now().await.map_err(|e| e.to_string())
}

/// Replace the local documents with the remote copy
pub async fn apply_remote_data(state: &AppState) -> Result<(), String> {
    let payload = state.sync.fetch_remote().await.map_err(|e| e.to_string())?;
    state
        .store
        .save_program(payload.program)
        .await
        .map_err(|e| e.to_string())?;
    state
        .store
        .save_progress(payload.progress)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Force the remote copy to match local state
pub async fn overwrite_drive_with_local(state: &AppState) -> Result<(), String> {
    state.sync.sync_now().await.map_err(|e| e.to_string())
}
