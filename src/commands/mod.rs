//! Commands Layer
//!
//! App-facing operations over the shared `AppState`, bridging callers
//! to the domain, repository, and sync layers. Errors are flattened to
//! strings at this boundary.

mod data_cmd;
mod item_cmd;
mod progress_cmd;
mod schedule_cmd;
mod sync_cmd;

pub use data_cmd::*;
pub use item_cmd::*;
pub use progress_cmd::*;
pub use schedule_cmd::*;
pub use sync_cmd::*;
