//! Validation
//!
//! Structural and semantic validators for items, schedule rules, and
//! whole program documents. Item and rule validators collect every
//! violated constraint so callers can show the full list.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use url::Url;

use super::item::{Item, ItemSchedule, ItemType, ScheduleKind};
use super::program::{Program, ScheduleRule, PROGRAM_VERSION};
use super::slot::{Slot, Weekday};

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("static pattern"))
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern"))
}

/// Check an item id: non-empty, lowercase `[a-z0-9_]`, not colliding
/// with an existing id
pub fn validate_item_id(id: &str, existing_ids: &[String]) -> Result<(), String> {
    if id.is_empty() {
        return Err("Item ID is required".to_string());
    }
    if !id_pattern().is_match(id) {
        return Err(
            "Item ID must be lowercase letters, numbers, and underscores only".to_string(),
        );
    }
    if existing_ids.iter().any(|existing| existing == id) {
        return Err("Item ID already exists".to_string());
    }
    Ok(())
}

/// All constraint violations for an item. The item's own id is excluded
/// from the collision set so edits validate cleanly.
pub fn validate_item(item: &Item, existing_ids: &[String]) -> Vec<String> {
    let mut errors = Vec::new();

    if item.id.is_empty() {
        errors.push("Item ID is required".to_string());
    } else {
        let others: Vec<String> = existing_ids
            .iter()
            .filter(|existing| existing.as_str() != item.id)
            .cloned()
            .collect();
        if let Err(error) = validate_item_id(&item.id, &others) {
            errors.push(error);
        }
    }

    if item.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }

    match item.item_type {
        ItemType::Timer => {
            if item.duration.unwrap_or(0) == 0 {
                errors.push("Duration must be greater than 0".to_string());
            }
        }
        ItemType::Link => match &item.url {
            None => errors.push("URL is required for link items".to_string()),
            Some(url) => {
                if Url::parse(url).is_err() {
                    errors.push("Invalid URL format".to_string());
                }
            }
        },
        ItemType::Check | ItemType::Note => {}
    }

    errors
}

/// All constraint violations for a legacy schedule rule
pub fn validate_schedule_rule(rule: &ScheduleRule, program: &Program) -> Vec<String> {
    let mut errors = Vec::new();

    if rule.kind == ScheduleKind::Unknown {
        errors.push("Rule type must be \"weekday\" or \"interval\"".to_string());
    }

    if rule.slot.is_none() {
        errors.push("Slot must be \"morning\", \"midday\", or \"evening\"".to_string());
    }

    let missing: Vec<&str> = rule
        .routines
        .iter()
        .filter(|id| !program.items.contains_key(id.as_str()))
        .map(|id| id.as_str())
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Items not found: {}", missing.join(", ")));
    }

    if rule.kind == ScheduleKind::Weekday && rule.days.is_empty() {
        errors.push("At least one day is required".to_string());
    }

    if rule.kind == ScheduleKind::Interval {
        if rule.every.unwrap_or(0) == 0 {
            errors.push("Interval must be greater than 0".to_string());
        }
        match rule.start_date.as_deref() {
            None | Some("") => errors.push("Start date is required".to_string()),
            Some(start_date) => {
                if !date_pattern().is_match(start_date) {
                    errors.push("Start date must be in YYYY-MM-DD format".to_string());
                }
            }
        }
    }

    errors
}

/// Shallow structural gate over a raw program document. Deliberately
/// does not recurse into items or rules; those are validated on the
/// editing paths.
pub fn validate_program(document: &Value) -> Result<(), String> {
    let Some(object) = document.as_object() else {
        return Err("Program must be an object".to_string());
    };
    if object.get("version").and_then(Value::as_u64) != Some(u64::from(PROGRAM_VERSION)) {
        return Err("Program version must be 2".to_string());
    }
    if !object.get("items").map(Value::is_object).unwrap_or(false) {
        return Err("Program must have items object".to_string());
    }
    if !object.get("playlists").map(Value::is_object).unwrap_or(false) {
        return Err("Program must have playlists object".to_string());
    }
    Ok(())
}

/// Which legacy structures reference an item; used to warn before delete
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDependencies {
    pub playlists: Vec<Slot>,
    pub schedule_rules: Vec<(usize, ScheduleRule)>,
}

pub fn find_item_dependencies(item_id: &str, program: &Program) -> ItemDependencies {
    let mut dependencies = ItemDependencies::default();

    for slot in Slot::ALL {
        if program.playlists.get(slot).iter().any(|r| r.id == item_id) {
            dependencies.playlists.push(slot);
        }
    }

    for (index, rule) in program.schedule.rules.iter().enumerate() {
        if rule.routines.iter().any(|id| id == item_id) {
            dependencies.schedule_rules.push((index, rule.clone()));
        }
    }

    dependencies
}

/// Derive an id from a title: lowercase, non-alphanumeric runs collapse
/// to a single underscore, capped at 50 characters. Uniqueness is the
/// caller's problem.
pub fn generate_item_id(title: &str) -> String {
    let lowered = title.to_lowercase();
    let collapsed = slug_pattern().replace_all(&lowered, "_");
    collapsed.trim_matches('_').chars().take(50).collect()
}

/// Best-effort reconstruction of an embedded schedule for an item that
/// only exists in legacy playlists or rules, for prefilling the editor.
/// Lossy on purpose: base-playlist membership reports as "every day",
/// several weekday rules collapse into one day-set union scoped to the
/// first rule's slot, and only the first interval rule is considered.
/// Display-only; never fed back into the mutation path.
pub fn extract_item_schedule(item_id: &str, program: &Program, today: NaiveDate) -> ItemSchedule {
    let today = today.format("%Y-%m-%d").to_string();

    for slot in Slot::ALL {
        if program.playlists.get(slot).iter().any(|r| r.id == item_id) {
            return ItemSchedule {
                kind: ScheduleKind::Weekday,
                days: Weekday::ALL.to_vec(),
                every: 1,
                start_date: today,
                slot,
            };
        }
    }

    let referencing: Vec<&ScheduleRule> = program
        .schedule
        .rules
        .iter()
        .filter(|rule| rule.routines.iter().any(|id| id == item_id))
        .collect();

    let weekday_rules: Vec<&&ScheduleRule> = referencing
        .iter()
        .filter(|rule| rule.kind == ScheduleKind::Weekday)
        .collect();
    if let Some(first) = weekday_rules.first() {
        let target_slot = first.slot.unwrap_or(Slot::Morning);
        let mut days: Vec<Weekday> = Vec::new();
        for rule in &weekday_rules {
            if rule.slot.unwrap_or(Slot::Morning) != target_slot {
                continue;
            }
            for day in &rule.days {
                if !days.contains(day) {
                    days.push(*day);
                }
            }
        }
        return ItemSchedule {
            kind: ScheduleKind::Weekday,
            days,
            every: 1,
            start_date: today,
            slot: target_slot,
        };
    }

    if let Some(interval) = referencing
        .iter()
        .find(|rule| rule.kind == ScheduleKind::Interval)
    {
        return ItemSchedule {
            kind: ScheduleKind::Interval,
            days: Vec::new(),
            every: interval.every.unwrap_or(3),
            start_date: interval
                .start_date
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or(today),
            slot: interval.slot.unwrap_or(Slot::Morning),
        };
    }

    ItemSchedule {
        kind: ScheduleKind::Weekday,
        days: Vec::new(),
        every: 3,
        start_date: today,
        slot: Slot::Morning,
    }
}
