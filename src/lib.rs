//! Habit Playlists Backend
//!
//! Personal habit/routine tracker engine: user-defined items (timers,
//! checklists, links, notes) scheduled into daily slots, a due-item
//! resolver over three generations of scheduling data, append-only
//! progress tracking, durable local storage, JSON import/export, and
//! best-effort mirroring to a cloud app-data file.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Durable document store and import/export
//! - sync: Cloud mirror (blob store port + Drive client + debouncer)
//! - commands: App-facing operation handlers

use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub mod commands;
pub mod domain;
pub mod repository;
pub mod sync;

use domain::DomainResult;
use repository::DocumentStore;
use sync::SyncManager;

/// Application state shared across commands
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub sync: Arc<SyncManager>,
}

impl AppState {
    /// Open the store at `db_path`, load documents (seeding from
    /// `seed` on first run), and wire up the sync manager
    pub async fn init(db_path: &Path, seed: Option<&Path>) -> DomainResult<Self> {
        let store = Arc::new(DocumentStore::open(db_path)?);
        store.load(seed).await?;
        let sync = Arc::new(SyncManager::new(Arc::clone(&store)));
        Ok(AppState { store, sync })
    }

    /// Fully in-memory state for tests and embedders
    pub async fn init_in_memory() -> DomainResult<Self> {
        let store = Arc::new(DocumentStore::open_in_memory()?);
        store.load(None).await?;
        let sync = Arc::new(SyncManager::new(Arc::clone(&store)));
        Ok(AppState { store, sync })
    }

    /// Nudge the debounced cloud upload after a local mutation
    pub(crate) async fn notify_mutation(&self) {
        Arc::clone(&self.sync).schedule_sync().await;
    }
}

/// Install a plain formatting subscriber; call once at startup
pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ItemPatch, ItemSchedule, Slot, Weekday};
    use crate::repository::ImportMode;

    #[tokio::test]
    async fn test_full_item_lifecycle_through_commands() {
        let state = AppState::init_in_memory().await.unwrap();

        let item = Item::check("stretch", "Stretch").with_schedule(ItemSchedule::weekday(
            vec![Weekday::Mon, Weekday::Wed],
            Slot::Morning,
        ));
        commands::create_item(&state, item).await.unwrap();

        // due on a Monday, not on a Tuesday
        let due = commands::items_for_slot(&state, "2024-01-01", Slot::Morning)
            .await
            .unwrap();
        assert_eq!(due, vec!["stretch"]);
        assert!(commands::items_for_slot(&state, "2024-01-02", Slot::Morning)
            .await
            .unwrap()
            .is_empty());

        commands::update_item(
            &state,
            "stretch",
            ItemPatch {
                title: Some("Long stretch".to_string()),
                ..ItemPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            commands::get_item(&state, "stretch").await.unwrap().title,
            "Long stretch"
        );

        commands::delete_item(&state, "stretch").await.unwrap();
        assert!(commands::get_item(&state, "stretch").await.is_none());
        let program = state.store.program().await;
        assert!(program.schedule.rules.is_empty());
    }

    #[tokio::test]
    async fn test_create_item_rejects_duplicates_and_bad_input() {
        let state = AppState::init_in_memory().await.unwrap();
        commands::create_item(&state, Item::check("a", "A")).await.unwrap();

        let error = commands::create_item(&state, Item::check("a", "Again"))
            .await
            .unwrap_err();
        assert!(error.contains("already exists"));

        let error = commands::create_item(&state, Item::timer("bad timer", "", 0))
            .await
            .unwrap_err();
        // every violation is reported, not just the first
        assert!(error.contains("lowercase"));
        assert!(error.contains("Title is required"));
        assert!(error.contains("Duration"));
    }

    #[tokio::test]
    async fn test_one_off_flow_through_commands() {
        let state = AppState::init_in_memory().await.unwrap();
        let gift = Item::check("gift", "Buy gift")
            .one_off()
            .with_schedule(ItemSchedule::weekday(Weekday::ALL.to_vec(), Slot::Morning));
        commands::create_item(&state, gift).await.unwrap();

        let pending = commands::pending_items_for_slot(&state, "2024-01-01", Slot::Morning)
            .await
            .unwrap();
        assert_eq!(pending, vec!["gift"]);

        commands::record_item_completion(&state, "gift", Slot::Morning, "2024-01-01")
            .await
            .unwrap();
        assert!(commands::is_item_completed(&state, "gift").await);
        assert!(commands::pending_items_for_slot(&state, "2024-01-01", Slot::Morning)
            .await
            .unwrap()
            .is_empty());

        commands::reset_one_offs(&state).await.unwrap();
        assert!(!commands::is_item_completed(&state, "gift").await);
        assert_eq!(
            commands::pending_items_for_slot(&state, "2024-01-01", Slot::Morning)
                .await
                .unwrap(),
            vec!["gift"]
        );
    }

    #[tokio::test]
    async fn test_export_import_replace_round_trip() {
        let state = AppState::init_in_memory().await.unwrap();
        commands::create_item(&state, Item::check("a", "A")).await.unwrap();
        let exported = commands::export_data(&state, false).await.unwrap();
        let original = state.store.program().await;

        let other = AppState::init_in_memory().await.unwrap();
        commands::import_data(&other, &exported, ImportMode::Replace)
            .await
            .unwrap();
        assert_eq!(other.store.program().await, original);
    }

    #[tokio::test]
    async fn test_import_merge_through_commands() {
        let state = AppState::init_in_memory().await.unwrap();
        commands::create_item(&state, Item::check("a", "A")).await.unwrap();
        commands::create_item(&state, Item::check("b", "B local")).await.unwrap();

        let other = AppState::init_in_memory().await.unwrap();
        commands::create_item(&other, Item::check("b", "B imported")).await.unwrap();
        commands::create_item(&other, Item::check("c", "C")).await.unwrap();
        let exported = commands::export_data(&other, false).await.unwrap();

        commands::import_data(&state, &exported, ImportMode::Merge)
            .await
            .unwrap();
        let program = state.store.program().await;
        assert_eq!(program.item_ids(), vec!["a", "b", "c"]);
        assert_eq!(program.items["b"].title, "B imported");
    }

    #[tokio::test]
    async fn test_invalid_date_is_reported() {
        let state = AppState::init_in_memory().await.unwrap();
        assert!(commands::items_for_date(&state, "01/02/2024").await.is_err());
    }
}
