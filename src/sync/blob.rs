//! Blob Store Port
//!
//! Abstract interface for the cloud file store the documents mirror to.
//! Implementations can target Drive, a test double, etc.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Errors from the blob store boundary
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The bearer credential was rejected; the user must reconnect
    Unauthorized,
    /// Non-401 HTTP failure
    Http { status: u16, message: String },
    /// Transport-level failure
    Network(String),
    /// Response body was not the expected shape
    Decode(String),
    /// No client configured
    NotConnected,
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Unauthorized => write!(f, "Authorization expired"),
            SyncError::Http { status, message } => write!(f, "{} (HTTP {})", message, status),
            SyncError::Network(msg) => write!(f, "Network error: {}", msg),
            SyncError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            SyncError::NotConnected => write!(f, "Cloud sync is not connected"),
        }
    }
}

impl std::error::Error for SyncError {}

impl SyncError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SyncError::Unauthorized)
    }
}

/// A file handle in the remote store
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "modifiedTime")]
    pub modified_time: Option<String>,
}

/// Opaque key-value file API over the cloud store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Look a file up by name; `None` when it does not exist yet
    async fn find_file(&self, name: &str) -> Result<Option<RemoteFile>, SyncError>;

    /// Create a file with the given JSON content
    async fn create_file(&self, name: &str, body: &Value) -> Result<RemoteFile, SyncError>;

    /// Fetch a file's JSON content
    async fn download(&self, file_id: &str) -> Result<Value, SyncError>;

    /// Replace a file's JSON content
    async fn upload(&self, file_id: &str, body: &Value) -> Result<(), SyncError>;
}
