//! Document Store
//!
//! Durable local persistence for the program and progress documents:
//! one SQLite table of string-keyed JSON blobs, written whole on every
//! save. Reads fall back to the legacy key names so older data keeps
//! loading without a migration step.
//!
//! The in-memory copies owned here are the single source of truth at
//! runtime; readers get clones and mutations replace the cache only
//! after a successful write.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::validation::validate_program;
use crate::domain::{DomainError, DomainResult, Program, Progress};

pub(crate) const KEY_PROGRAM: &str = "habitPlaylistProgramV2";
pub(crate) const KEY_PROGRESS: &str = "habitPlaylistProgressV2";
// Legacy keys (backward compatibility)
pub(crate) const LEGACY_KEY_PROGRAM: &str = "postureCoachUserProgramV2";
pub(crate) const LEGACY_KEY_PROGRESS: &str = "postureCoachProgressV2";

pub struct DocumentStore {
    conn: Mutex<Connection>,
    program: Mutex<Program>,
    progress: Mutex<Progress>,
}

impl DocumentStore {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> DomainResult<Self> {
        let conn = Connection::open(path).map_err(storage_error)?;
        Self::with_connection(conn)
    }

    /// In-memory store for tests and embedders
    pub fn open_in_memory() -> DomainResult<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> DomainResult<Self> {
        run_migrations(&conn)?;
        Ok(DocumentStore {
            conn: Mutex::new(conn),
            program: Mutex::new(Program::default_program()),
            progress: Mutex::new(Progress::default()),
        })
    }

    /// Load both documents: stored copy first (legacy key as fallback),
    /// then the optional seed file, then built-in defaults. A freshly
    /// seeded or repaired program is persisted right away.
    pub async fn load(&self, seed: Option<&Path>) -> DomainResult<()> {
        let stored = {
            let conn = self.conn.lock().await;
            read_slot(&conn, KEY_PROGRAM, Some(LEGACY_KEY_PROGRAM))?
        };

        let (mut program, mut dirty) = match stored.and_then(|raw| parse_program(&raw)) {
            Some(program) => (program, false),
            None => (seed_program(seed), true),
        };

        // embedded exercise content is legacy payload; always start empty
        if !program.content.exercises.is_empty() {
            program.content.exercises.clear();
            dirty = true;
        }

        if dirty {
            let raw = to_raw(&program)?;
            let conn = self.conn.lock().await;
            write_slot(&conn, KEY_PROGRAM, &raw)?;
        }
        *self.program.lock().await = program;

        let stored_progress = {
            let conn = self.conn.lock().await;
            read_slot(&conn, KEY_PROGRESS, Some(LEGACY_KEY_PROGRESS))?
        };
        let progress = match stored_progress {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(progress) => progress,
                Err(error) => {
                    warn!("stored progress is unreadable, starting fresh: {}", error);
                    Progress::default()
                }
            },
            None => Progress::default(),
        };
        *self.progress.lock().await = progress;

        info!("documents loaded");
        Ok(())
    }

    /// Current program snapshot
    pub async fn program(&self) -> Program {
        self.program.lock().await.clone()
    }

    /// Current progress snapshot
    pub async fn progress(&self) -> Progress {
        self.progress.lock().await.clone()
    }

    /// Validate, persist, then swap the in-memory program. A rejected
    /// write leaves the last-known-good snapshot in place.
    pub async fn save_program(&self, program: Program) -> DomainResult<()> {
        let document = serde_json::to_value(&program).map_err(storage_error)?;
        if let Err(error) = validate_program(&document) {
            return Err(DomainError::Validation(vec![error]));
        }
        {
            let conn = self.conn.lock().await;
            write_slot(&conn, KEY_PROGRAM, &document.to_string())?;
        }
        *self.program.lock().await = program;
        Ok(())
    }

    /// Persist, then swap the in-memory progress
    pub async fn save_progress(&self, progress: Progress) -> DomainResult<()> {
        let raw = serde_json::to_string(&progress).map_err(storage_error)?;
        {
            let conn = self.conn.lock().await;
            write_slot(&conn, KEY_PROGRESS, &raw)?;
        }
        *self.progress.lock().await = progress;
        Ok(())
    }

    /// Raw write into a document slot; test and migration helper
    #[cfg(test)]
    pub(crate) async fn put_raw(&self, key: &str, raw: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        write_slot(&conn, key, raw)
    }

    /// Make every subsequent write fail
    #[cfg(test)]
    pub(crate) async fn break_storage(&self) {
        let conn = self.conn.lock().await;
        conn.execute("DROP TABLE documents", ())
            .expect("failed to drop table");
    }
}

fn storage_error(error: impl std::fmt::Display) -> DomainError {
    DomainError::Storage(error.to_string())
}

fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )
    .map_err(storage_error)?;
    Ok(())
}

fn read_slot(conn: &Connection, key: &str, legacy: Option<&str>) -> DomainResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM documents WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(storage_error)?;
    match value {
        Some(value) => Ok(Some(value)),
        None => match legacy {
            Some(legacy_key) => read_slot(conn, legacy_key, None),
            None => Ok(None),
        },
    }
}

fn write_slot(conn: &Connection, key: &str, raw: &str) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO documents (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, raw],
    )
    .map_err(|error| {
        warn!("failed to write {}: {}", key, error);
        storage_error(error)
    })?;
    Ok(())
}

fn to_raw(program: &Program) -> DomainResult<String> {
    serde_json::to_string(program).map_err(storage_error)
}

/// Parse and gate a stored program document; any failure falls through
/// to the seed/defaults
fn parse_program(raw: &str) -> Option<Program> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(error) => {
            warn!("stored program is not valid JSON: {}", error);
            return None;
        }
    };
    if let Err(error) = validate_program(&document) {
        warn!("stored program rejected: {}", error);
        return None;
    }
    match serde_json::from_value(document) {
        Ok(program) => Some(program),
        Err(error) => {
            warn!("stored program has an unreadable shape: {}", error);
            None
        }
    }
}

/// Read the seed document (either `{"program": …}` or the program
/// itself). Every failure path lands on the built-in defaults.
fn seed_program(seed: Option<&Path>) -> Program {
    let Some(path) = seed else {
        return Program::default_program();
    };
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            warn!("seed {} unreadable: {}", path.display(), error);
            return Program::default_program();
        }
    };
    let document: Value = match serde_json::from_str(&raw) {
        Ok(document) => document,
        Err(error) => {
            warn!("seed {} is not valid JSON: {}", path.display(), error);
            return Program::default_program();
        }
    };
    let program_value = match document.get("program") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => document,
    };
    if let Err(error) = validate_program(&program_value) {
        warn!("seed program rejected: {}", error);
        return Program::default_program();
    }
    match serde_json::from_value(program_value) {
        Ok(program) => {
            info!("seeded program from {}", path.display());
            program
        }
        Err(error) => {
            warn!("seed program has an unreadable shape: {}", error);
            Program::default_program()
        }
    }
}
