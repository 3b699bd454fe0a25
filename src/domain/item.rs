//! Item Entity
//!
//! An item is a single user-defined activity: a timed exercise, a
//! checklist entry, a link to open, or a note to read. Its optional
//! embedded schedule is the authoritative recurrence expression; legacy
//! playlists and rules are kept in step by the mutator.

use serde::{Deserialize, Serialize};

use super::slot::{Slot, Weekday};

/// Item type determines behavior and which type-specific fields apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Countdown timer, requires a duration in seconds
    Timer,
    /// Checklist entry, confirmed by hand
    Check,
    /// External link, requires a URL
    Link,
    /// Free-form note
    Note,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Timer => "timer",
            ItemType::Check => "check",
            ItemType::Link => "link",
            ItemType::Note => "note",
        }
    }
}

/// Recurrence flavor of a schedule or rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// Applies on a fixed set of weekdays
    Weekday,
    /// Applies every N days from a start date
    Interval,
    /// Anything else; never applies
    #[serde(other)]
    Unknown,
}

/// Recurrence embedded on an item. Only the fields relevant to `kind`
/// are meaningful; the others keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSchedule {
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub every: u32,
    #[serde(default)]
    pub start_date: String,
    pub slot: Slot,
}

impl ItemSchedule {
    pub fn weekday(days: Vec<Weekday>, slot: Slot) -> Self {
        ItemSchedule {
            kind: ScheduleKind::Weekday,
            days,
            every: 0,
            start_date: String::new(),
            slot,
        }
    }

    pub fn interval(every: u32, start_date: impl Into<String>, slot: Slot) -> Self {
        ItemSchedule {
            kind: ScheduleKind::Interval,
            days: Vec::new(),
            every,
            start_date: start_date.into(),
            slot,
        }
    }
}

/// A user-defined activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique within a program, lowercase `[a-z0-9_]`, immutable after creation
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Seconds; timer items only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Link items only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Presented at most once until explicitly reset
    #[serde(default)]
    pub one_off: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ItemSchedule>,
}

fn default_enabled() -> bool {
    true
}

impl Item {
    fn base(id: impl Into<String>, item_type: ItemType, title: impl Into<String>) -> Self {
        Item {
            id: id.into(),
            item_type,
            title: title.into(),
            description: None,
            duration: None,
            url: None,
            tags: Vec::new(),
            one_off: false,
            enabled: true,
            schedule: None,
        }
    }

    /// Create a timer item
    pub fn timer(id: impl Into<String>, title: impl Into<String>, duration: u32) -> Self {
        let mut item = Item::base(id, ItemType::Timer, title);
        item.duration = Some(duration);
        item
    }

    /// Create a check item
    pub fn check(id: impl Into<String>, title: impl Into<String>) -> Self {
        Item::base(id, ItemType::Check, title)
    }

    /// Create a link item
    pub fn link(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        let mut item = Item::base(id, ItemType::Link, title);
        item.url = Some(url.into());
        item
    }

    /// Create a note item
    pub fn note(id: impl Into<String>, title: impl Into<String>) -> Self {
        Item::base(id, ItemType::Note, title)
    }

    pub fn with_schedule(mut self, schedule: ItemSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn one_off(mut self) -> Self {
        self.one_off = true;
        self
    }
}

/// Field replacements for an item update. `id` and `type` are fixed at
/// creation and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub one_off: Option<bool>,
    pub enabled: Option<bool>,
    pub schedule: Option<ItemSchedule>,
}

impl ItemPatch {
    /// Shallow field replacement into an existing item
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }
        if let Some(duration) = self.duration {
            item.duration = Some(duration);
        }
        if let Some(url) = &self.url {
            item.url = Some(url.clone());
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        if let Some(one_off) = self.one_off {
            item.one_off = one_off;
        }
        if let Some(enabled) = self.enabled {
            item.enabled = enabled;
        }
        if let Some(schedule) = &self.schedule {
            item.schedule = Some(schedule.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = Item::timer("neck_rolls", "Neck rolls", 60);
        assert_eq!(item.id, "neck_rolls");
        assert_eq!(item.duration, Some(60));
        assert!(item.enabled);
        assert!(!item.one_off);
    }

    #[test]
    fn test_item_wire_format() {
        let item = Item::link("docs", "Read docs", "https://example.com").one_off();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["oneOff"], true);
        assert_eq!(json["url"], "https://example.com");
        // absent type-specific fields are not serialized
        assert!(json.get("duration").is_none());
    }

    #[test]
    fn test_item_defaults_on_deserialize() {
        let item: Item =
            serde_json::from_str(r#"{"id":"x","type":"check","title":"X"}"#).unwrap();
        assert!(item.enabled);
        assert!(item.tags.is_empty());
        assert!(item.schedule.is_none());
    }

    #[test]
    fn test_unknown_schedule_kind_deserializes() {
        let schedule: ItemSchedule =
            serde_json::from_str(r#"{"type":"monthly","slot":"morning"}"#).unwrap();
        assert_eq!(schedule.kind, ScheduleKind::Unknown);
    }

    #[test]
    fn test_patch_apply() {
        let mut item = Item::check("stretch", "Stretch");
        let patch = ItemPatch {
            title: Some("Full stretch".to_string()),
            enabled: Some(false),
            ..ItemPatch::default()
        };
        patch.apply_to(&mut item);
        assert_eq!(item.title, "Full stretch");
        assert!(!item.enabled);
        assert_eq!(item.id, "stretch");
    }
}
