//! Progress Ledger
//!
//! Append-only records of walkthrough sessions and item completions,
//! plus the one-off reset. Pure over `&Progress`; timestamps are
//! injected by the caller.

use chrono::{DateTime, Utc};

use super::program::Program;
use super::progress::{ItemCompletion, Progress, SessionRecord};
use super::slot::Slot;

/// Append a session record. Both timestamps carry the close instant;
/// wall-clock duration is not tracked.
pub fn record_session(
    progress: &Progress,
    slot: Slot,
    date: &str,
    items_completed: u32,
    total_items: u32,
    now: DateTime<Utc>,
) -> Progress {
    let mut next = progress.clone();
    next.sessions.push(SessionRecord {
        slot,
        date: date.to_string(),
        started_at: now,
        completed_at: now,
        items_completed,
        total_items,
    });
    next
}

/// Append an item completion record
pub fn record_item_completion(
    progress: &Progress,
    item_id: &str,
    slot: Slot,
    date: &str,
    now: DateTime<Utc>,
) -> Progress {
    let mut next = progress.clone();
    next.item_completions.push(ItemCompletion {
        item_id: item_id.to_string(),
        slot,
        date: date.to_string(),
        completed_at: now,
    });
    next
}

/// True iff the item exists, is one-off, and has any completion on
/// record. Completions never expire by date, only by explicit reset.
pub fn is_item_completed(progress: &Progress, program: &Program, item_id: &str) -> bool {
    let Some(item) = program.items.get(item_id) else {
        return false;
    };
    if !item.one_off {
        return false;
    }
    progress
        .item_completions
        .iter()
        .any(|completion| completion.item_id == item_id)
}

/// Clear all one-off suppression: keep a completion only if its item
/// still exists and is not one-off. Completions of deleted items are
/// dropped along the way.
pub fn reset_one_offs(progress: &Progress, program: &Program) -> Progress {
    let mut next = progress.clone();
    next.item_completions.retain(|completion| {
        program
            .items
            .get(&completion.item_id)
            .map(|item| !item.one_off)
            .unwrap_or(false)
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutate::add_item;
    use crate::domain::Item;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_record_session_appends() {
        let progress = Progress::default();
        let next = record_session(&progress, Slot::Morning, "2024-01-01", 3, 4, now());
        assert_eq!(next.sessions.len(), 1);
        let session = &next.sessions[0];
        assert_eq!(session.items_completed, 3);
        assert_eq!(session.total_items, 4);
        assert_eq!(session.started_at, session.completed_at);
        // the original is untouched
        assert!(progress.sessions.is_empty());
    }

    #[test]
    fn test_one_off_lifecycle() {
        let program = add_item(
            &Program::default_program(),
            Item::check("gift", "Buy a gift").one_off(),
        );
        let mut progress = Progress::default();
        assert!(!is_item_completed(&progress, &program, "gift"));

        progress = record_item_completion(&progress, "gift", Slot::Morning, "2024-01-01", now());
        assert!(is_item_completed(&progress, &program, "gift"));

        progress = reset_one_offs(&progress, &program);
        assert!(!is_item_completed(&progress, &program, "gift"));
        assert!(progress.item_completions.is_empty());
    }

    #[test]
    fn test_completion_of_regular_item_does_not_suppress() {
        let program = add_item(&Program::default_program(), Item::check("daily", "Daily"));
        let progress =
            record_item_completion(&Progress::default(), "daily", Slot::Morning, "2024-01-01", now());
        assert!(!is_item_completed(&progress, &program, "daily"));
    }

    #[test]
    fn test_reset_keeps_regular_completions_drops_orphans() {
        let program = add_item(&Program::default_program(), Item::check("daily", "Daily"));
        let mut progress = Progress::default();
        progress = record_item_completion(&progress, "daily", Slot::Morning, "2024-01-01", now());
        progress = record_item_completion(&progress, "deleted", Slot::Morning, "2024-01-01", now());

        let next = reset_one_offs(&progress, &program);
        assert_eq!(next.item_completions.len(), 1);
        assert_eq!(next.item_completions[0].item_id, "daily");
    }

    #[test]
    fn test_completed_missing_item_is_not_completed() {
        let program = Program::default_program();
        let progress =
            record_item_completion(&Progress::default(), "ghost", Slot::Morning, "2024-01-01", now());
        assert!(!is_item_completed(&progress, &program, "ghost"));
    }
}
