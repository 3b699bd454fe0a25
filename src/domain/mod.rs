//! Domain Layer
//!
//! Core entities and business rules: the program/progress documents,
//! schedule resolution, program mutation, validation, and the progress
//! ledger. This layer does no I/O (serde is the only external concern).

mod item;
mod program;
mod progress;
mod slot;

pub mod ledger;
pub mod mutate;
pub mod schedule;
pub mod validation;

pub use item::{Item, ItemPatch, ItemSchedule, ItemType, ScheduleKind};
pub use program::{
    ContentSection, Playlists, PlaylistRef, Program, ScheduleRule, ScheduleSection, Settings,
    SettingsPatch, PROGRAM_VERSION,
};
pub use progress::{ItemCompletion, Progress, SessionRecord};
pub use slot::{Slot, Weekday};

use serde::{Deserialize, Serialize};

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainError {
    /// Operation on an item id that does not exist
    NotFound(String),
    /// One or more constraint violations; carries the full list
    Validation(Vec<String>),
    /// Malformed JSON at a document boundary
    Parse(String),
    /// The durable store rejected a read or write
    Storage(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Validation(errors) => write!(f, "{}", errors.join("; ")),
            DomainError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
