//! Program Document
//!
//! The root document: the item catalog plus three generations of
//! scheduling data (embedded per-item schedules, legacy per-slot
//! playlists, legacy rule lists). All three are kept consistent by the
//! mutator so older documents keep working without a migration step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{Item, ScheduleKind};
use super::slot::{Slot, Weekday};

pub const PROGRAM_VERSION: u32 = 2;

/// Reference to an item from a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
}

impl PlaylistRef {
    pub fn new(id: impl Into<String>) -> Self {
        PlaylistRef { id: id.into() }
    }
}

/// Legacy static playlists: membership means "applies every day in that
/// slot"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlists {
    #[serde(default)]
    pub morning: Vec<PlaylistRef>,
    #[serde(default)]
    pub midday: Vec<PlaylistRef>,
    #[serde(default)]
    pub evening: Vec<PlaylistRef>,
}

impl Playlists {
    pub fn get(&self, slot: Slot) -> &Vec<PlaylistRef> {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Midday => &self.midday,
            Slot::Evening => &self.evening,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut Vec<PlaylistRef> {
        match slot {
            Slot::Morning => &mut self.morning,
            Slot::Midday => &mut self.midday,
            Slot::Evening => &mut self.evening,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Slot, &mut Vec<PlaylistRef>)> + '_ {
        [
            (Slot::Morning, &mut self.morning),
            (Slot::Midday, &mut self.midday),
            (Slot::Evening, &mut self.evening),
        ]
        .into_iter()
    }

    /// True if any slot references the given item id
    pub fn contains(&self, item_id: &str) -> bool {
        Slot::ALL
            .iter()
            .any(|slot| self.get(*slot).iter().any(|r| r.id == item_id))
    }
}

/// Legacy recurrence rule bound to an ordered list of item ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRule {
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    /// Absent means the rule applies in any slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub routines: Vec<String>,
}

impl ScheduleRule {
    pub fn weekday(days: Vec<Weekday>, slot: Slot, routines: Vec<String>) -> Self {
        ScheduleRule {
            kind: ScheduleKind::Weekday,
            slot: Some(slot),
            days,
            every: None,
            start_date: None,
            routines,
        }
    }

    pub fn interval(
        every: u32,
        start_date: impl Into<String>,
        slot: Slot,
        routines: Vec<String>,
    ) -> Self {
        ScheduleRule {
            kind: ScheduleKind::Interval,
            slot: Some(slot),
            days: Vec::new(),
            every: Some(every),
            start_date: Some(start_date.into()),
            routines,
        }
    }
}

/// Rule list plus the reserved per-date override map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSection {
    #[serde(default)]
    pub rules: Vec<ScheduleRule>,
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

/// Embedded content blobs; always emptied at load time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub exercises: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_tones")]
    pub tones: bool,
    #[serde(default)]
    pub wake_lock_default: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_tones() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_theme() -> String {
    "lofi".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tones: true,
            wake_lock_default: false,
            language: default_language(),
            theme: default_theme(),
        }
    }
}

/// Partial settings update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub tones: Option<bool>,
    pub wake_lock_default: Option<bool>,
    pub language: Option<String>,
    pub theme: Option<String>,
}

impl SettingsPatch {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(tones) = self.tones {
            settings.tones = tones;
        }
        if let Some(wake_lock) = self.wake_lock_default {
            settings.wake_lock_default = wake_lock;
        }
        if let Some(language) = &self.language {
            settings.language = language.clone();
        }
        if let Some(theme) = &self.theme {
            settings.theme = theme.clone();
        }
    }
}

/// The root program document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub version: u32,
    pub items: BTreeMap<String, Item>,
    pub playlists: Playlists,
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub content: ContentSection,
    #[serde(default)]
    pub settings: Settings,
}

impl Program {
    /// A fresh, empty program document
    pub fn default_program() -> Self {
        Program {
            version: PROGRAM_VERSION,
            items: BTreeMap::new(),
            playlists: Playlists::default(),
            schedule: ScheduleSection::default(),
            content: ContentSection::default(),
            settings: Settings::default(),
        }
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}
