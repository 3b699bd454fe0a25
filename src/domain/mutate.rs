//! Program Mutation
//!
//! Add/update/delete operations over the program document. Each returns
//! a fresh snapshot; the caller persists it (or drops it on failure).
//!
//! An item's embedded schedule is the single authoritative recurrence
//! expression. Whenever one is set, `apply_item_schedule` rewrites the
//! legacy playlists and rule list so the item is referenced from at most
//! one place; it is the only code path that writes those structures.

use super::item::{Item, ItemPatch, ItemSchedule, ScheduleKind};
use super::program::{Program, ScheduleRule};
use super::slot::Weekday;
use super::{DomainError, DomainResult};

/// Insert a new item; a provided schedule is mirrored into the legacy
/// structures
pub fn add_item(program: &Program, item: Item) -> Program {
    let mut next = program.clone();
    let item_id = item.id.clone();
    let schedule = item.schedule.clone();
    next.items.insert(item_id.clone(), item);
    if let Some(schedule) = schedule {
        apply_item_schedule(&mut next, &item_id, &schedule);
    }
    next
}

/// Merge a patch into an existing item; fails if the id is unknown
pub fn update_item(program: &Program, item_id: &str, patch: &ItemPatch) -> DomainResult<Program> {
    if !program.items.contains_key(item_id) {
        return Err(DomainError::NotFound(format!("item '{}'", item_id)));
    }
    let mut next = program.clone();
    if let Some(item) = next.items.get_mut(item_id) {
        patch.apply_to(item);
    }
    if let Some(schedule) = &patch.schedule {
        apply_item_schedule(&mut next, item_id, schedule);
    }
    Ok(next)
}

/// Remove an item and every playlist/rule reference to it. Progress is
/// left alone; orphaned completion records are ignored downstream.
pub fn delete_item(program: &Program, item_id: &str) -> DomainResult<Program> {
    if !program.items.contains_key(item_id) {
        return Err(DomainError::NotFound(format!("item '{}'", item_id)));
    }
    let mut next = program.clone();
    next.items.remove(item_id);
    unbind_everywhere(&mut next, item_id);
    Ok(next)
}

/// Rebind an item's due expression: strip every legacy reference, then
/// bind the new schedule into the rule list
pub(crate) fn apply_item_schedule(program: &mut Program, item_id: &str, schedule: &ItemSchedule) {
    unbind_everywhere(program, item_id);
    bind_schedule(program, item_id, schedule);
}

/// Remove the id from all playlists and rule routines; rules left empty
/// are dropped
fn unbind_everywhere(program: &mut Program, item_id: &str) {
    for (_, refs) in program.playlists.iter_mut() {
        refs.retain(|r| r.id != item_id);
    }
    for rule in program.schedule.rules.iter_mut() {
        rule.routines.retain(|id| id != item_id);
    }
    program.schedule.rules.retain(|rule| !rule.routines.is_empty());
}

fn sorted(days: &[Weekday]) -> Vec<Weekday> {
    let mut days = days.to_vec();
    days.sort();
    days
}

fn bind_schedule(program: &mut Program, item_id: &str, schedule: &ItemSchedule) {
    match schedule.kind {
        ScheduleKind::Weekday => {
            let days = sorted(&schedule.days);
            if days.is_empty() {
                // no days selected means the item is simply unscheduled
                return;
            }
            let matching = program.schedule.rules.iter_mut().find(|rule| {
                rule.kind == ScheduleKind::Weekday
                    && rule.slot == Some(schedule.slot)
                    && sorted(&rule.days) == days
            });
            match matching {
                Some(rule) => {
                    if !rule.routines.iter().any(|id| id == item_id) {
                        rule.routines.push(item_id.to_string());
                    }
                }
                None => program.schedule.rules.push(ScheduleRule::weekday(
                    days,
                    schedule.slot,
                    vec![item_id.to_string()],
                )),
            }
        }
        ScheduleKind::Interval => {
            let matching = program.schedule.rules.iter_mut().find(|rule| {
                rule.kind == ScheduleKind::Interval
                    && rule.every == Some(schedule.every)
                    && rule.start_date.as_deref() == Some(schedule.start_date.as_str())
                    && rule.slot == Some(schedule.slot)
            });
            match matching {
                Some(rule) => {
                    if !rule.routines.iter().any(|id| id == item_id) {
                        rule.routines.push(item_id.to_string());
                    }
                }
                None => program.schedule.rules.push(ScheduleRule::interval(
                    schedule.every,
                    schedule.start_date.clone(),
                    schedule.slot,
                    vec![item_id.to_string()],
                )),
            }
        }
        ScheduleKind::Unknown => {}
    }
}
