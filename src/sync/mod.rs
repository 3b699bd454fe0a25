//! Cloud Sync
//!
//! Best-effort mirroring of the local documents to a single remote
//! file, last writer wins. Local mutations always succeed regardless of
//! sync health; each one nudges a debounced upload so edit bursts
//! coalesce into one request. Authorization expiry parks the connection
//! in a needs-reauthorization state until the user reconnects; any
//! other failure is recorded and waits for the next nudge or a manual
//! trigger.

mod blob;
mod drive;

pub use blob::{BlobStore, RemoteFile, SyncError};
pub use drive::DriveClient;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::{Program, Progress};
use crate::repository::DocumentStore;

/// Default name of the mirror file in the remote app-data folder
pub const DEFAULT_SYNC_FILE: &str = "habit-playlists.json";
pub const SYNC_PAYLOAD_VERSION: u32 = 1;

/// Quiet interval between the last mutation and the upload it triggers
const SYNC_DEBOUNCE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Disconnected,
    Connected,
    NeedsReauth,
}

/// What gets mirrored: both documents plus envelope metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    pub program: Program,
    pub progress: Progress,
}

/// Snapshot of the connection state for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub status: SyncStatus,
    pub file_name: String,
    pub last_error: Option<String>,
}

struct SyncInner {
    client: Option<Arc<dyn BlobStore>>,
    file_name: String,
    file_id: Option<String>,
    status: SyncStatus,
    last_error: Option<String>,
    pending: Option<JoinHandle<()>>,
}

/// Owns the whole sync context: client, remote file handle, status.
/// Passed around explicitly; there is no global state.
pub struct SyncManager {
    store: Arc<DocumentStore>,
    debounce: Duration,
    inner: Mutex<SyncInner>,
}

impl SyncManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self::with_debounce(store, SYNC_DEBOUNCE)
    }

    pub fn with_debounce(store: Arc<DocumentStore>, debounce: Duration) -> Self {
        SyncManager {
            store,
            debounce,
            inner: Mutex::new(SyncInner {
                client: None,
                file_name: DEFAULT_SYNC_FILE.to_string(),
                file_id: None,
                status: SyncStatus::Disconnected,
                last_error: None,
                pending: None,
            }),
        }
    }

    /// Attach a client and find or create the remote file
    pub async fn connect(
        &self,
        client: Arc<dyn BlobStore>,
        file_name: Option<String>,
    ) -> Result<(), SyncError> {
        let name = {
            let mut inner = self.inner.lock().await;
            inner.client = Some(Arc::clone(&client));
            if let Some(name) = file_name {
                inner.file_name = name;
            }
            inner.file_id = None;
            inner.status = SyncStatus::Disconnected;
            inner.last_error = None;
            inner.file_name.clone()
        };

        let outcome: Result<String, SyncError> = async {
            if let Some(file) = client.find_file(&name).await? {
                return Ok(file.id);
            }
            let payload = self.payload_value().await?;
            Ok(client.create_file(&name, &payload).await?.id)
        }
        .await;

        match outcome {
            Ok(file_id) => {
                let mut inner = self.inner.lock().await;
                inner.file_id = Some(file_id);
                inner.status = SyncStatus::Connected;
                info!("cloud sync connected ({})", name);
                Ok(())
            }
            Err(error) => {
                self.record_failure(&error).await;
                Err(error)
            }
        }
    }

    /// Drop the client and any pending upload
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        inner.client = None;
        inner.file_id = None;
        inner.status = SyncStatus::Disconnected;
        inner.last_error = None;
        info!("cloud sync disconnected");
    }

    pub async fn status(&self) -> SyncReport {
        let inner = self.inner.lock().await;
        SyncReport {
            status: inner.status,
            file_name: inner.file_name.clone(),
            last_error: inner.last_error.clone(),
        }
    }

    /// Called after every local mutation. Replaces any pending upload
    /// with a fresh one scheduled a quiet interval from now.
    pub async fn schedule_sync(self: Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if inner.client.is_none() || inner.status == SyncStatus::NeedsReauth {
            return;
        }
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        let manager = Arc::clone(&self);
        let debounce = self.debounce;
        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // failures are recorded on the manager; nothing to do here
            let _ = manager.sync_now().await;
        }));
    }

    /// Upload the local documents immediately
    pub async fn sync_now(&self) -> Result<(), SyncError> {
        let (client, name, file_id, status) = {
            let inner = self.inner.lock().await;
            (
                inner.client.clone(),
                inner.file_name.clone(),
                inner.file_id.clone(),
                inner.status,
            )
        };
        let Some(client) = client else {
            return Err(SyncError::NotConnected);
        };
        if status == SyncStatus::NeedsReauth {
            return Err(SyncError::Unauthorized);
        }

        let payload = self.payload_value().await?;
        let outcome: Result<String, SyncError> = async {
            if let Some(id) = file_id {
                client.upload(&id, &payload).await?;
                return Ok(id);
            }
            if let Some(file) = client.find_file(&name).await? {
                client.upload(&file.id, &payload).await?;
                return Ok(file.id);
            }
            // create carries the payload already
            Ok(client.create_file(&name, &payload).await?.id)
        }
        .await;

        match outcome {
            Ok(file_id) => {
                let mut inner = self.inner.lock().await;
                inner.file_id = Some(file_id);
                inner.status = SyncStatus::Connected;
                inner.last_error = None;
                info!("documents mirrored to {}", name);
                Ok(())
            }
            Err(error) => {
                self.record_failure(&error).await;
                Err(error)
            }
        }
    }

    /// Download and parse the remote payload
    pub async fn fetch_remote(&self) -> Result<SyncPayload, SyncError> {
        let (client, name, file_id) = {
            let inner = self.inner.lock().await;
            (
                inner.client.clone(),
                inner.file_name.clone(),
                inner.file_id.clone(),
            )
        };
        let Some(client) = client else {
            return Err(SyncError::NotConnected);
        };

        let outcome: Result<SyncPayload, SyncError> = async {
            let file_id = match file_id {
                Some(id) => id,
                None => match client.find_file(&name).await? {
                    Some(file) => file.id,
                    None => return Err(SyncError::NotConnected),
                },
            };
            let value = client.download(&file_id).await?;
            serde_json::from_value(value).map_err(|e| SyncError::Decode(e.to_string()))
        }
        .await;

        if let Err(error) = &outcome {
            self.record_failure(error).await;
        }
        outcome
    }

    async fn payload_value(&self) -> Result<Value, SyncError> {
        let payload = SyncPayload {
            version: SYNC_PAYLOAD_VERSION,
            updated_at: Utc::now(),
            program: self.store.program().await,
            progress: self.store.progress().await,
        };
        serde_json::to_value(&payload).map_err(|e| SyncError::Decode(e.to_string()))
    }

    async fn record_failure(&self, error: &SyncError) {
        let mut inner = self.inner.lock().await;
        if error.is_unauthorized() {
            inner.status = SyncStatus::NeedsReauth;
            warn!("cloud authorization expired; reconnect required");
        } else {
            inner.last_error = Some(error.to_string());
            warn!("cloud sync failed: {}", error);
        }
    }
}
