//! Repository Layer
//!
//! Durable persistence for the program/progress documents and the
//! import/export boundary.

mod store;
mod transfer;


pub use store::DocumentStore;
pub use transfer::{export_json, merge_programs, parse_import, ImportBundle, ImportMode};
