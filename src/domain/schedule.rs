//! Schedule Resolution
//!
//! Decides which items are due on a date. Three sources are unioned, in
//! order: embedded per-item schedules, legacy per-slot playlists
//! ("every day"), legacy rule lists. First occurrence of an id wins;
//! references to items that no longer exist are skipped.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::item::{ItemSchedule, ScheduleKind};
use super::program::{Program, ScheduleRule};
use super::progress::Progress;
use super::ledger;
use super::slot::{Slot, Weekday};

/// The common recurrence shape behind embedded schedules and legacy rules
pub enum Recurrence<'a> {
    Weekday(&'a [Weekday]),
    Interval { every: u32, start_date: &'a str },
    /// Unrecognized kind; never applies
    Never,
}

impl Recurrence<'_> {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Weekday(days) => days.contains(&Weekday::from(date.weekday())),
            Recurrence::Interval { every, start_date } => {
                let Ok(start) = NaiveDate::parse_from_str(start_date, "%Y-%m-%d") else {
                    return false;
                };
                if *every == 0 {
                    return false;
                }
                let offset = date.signed_duration_since(start).num_days();
                offset >= 0 && offset % i64::from(*every) == 0
            }
            Recurrence::Never => false,
        }
    }
}

impl ItemSchedule {
    pub fn recurrence(&self) -> Recurrence<'_> {
        match self.kind {
            ScheduleKind::Weekday => Recurrence::Weekday(&self.days),
            ScheduleKind::Interval => Recurrence::Interval {
                every: self.every,
                start_date: &self.start_date,
            },
            ScheduleKind::Unknown => Recurrence::Never,
        }
    }

    /// True iff this schedule puts its item into the given date and slot
    pub fn applies_on(&self, date: NaiveDate, slot: Slot) -> bool {
        self.slot == slot && self.recurrence().applies_on(date)
    }
}

impl ScheduleRule {
    pub fn recurrence(&self) -> Recurrence<'_> {
        match self.kind {
            ScheduleKind::Weekday => Recurrence::Weekday(&self.days),
            ScheduleKind::Interval => Recurrence::Interval {
                every: self.every.unwrap_or(0),
                start_date: self.start_date.as_deref().unwrap_or(""),
            },
            ScheduleKind::Unknown => Recurrence::Never,
        }
    }

    /// A rule without a slot applies in every slot
    pub fn applies_on(&self, date: NaiveDate, slot: Slot) -> bool {
        if let Some(rule_slot) = self.slot {
            if rule_slot != slot {
                return false;
            }
        }
        self.recurrence().applies_on(date)
    }
}

/// Due item ids per slot for one date
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaySchedule {
    pub morning: Vec<String>,
    pub midday: Vec<String>,
    pub evening: Vec<String>,
}

impl DaySchedule {
    pub fn get(&self, slot: Slot) -> &Vec<String> {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Midday => &self.midday,
            Slot::Evening => &self.evening,
        }
    }
}

/// Item ids due on a date and slot, deduplicated, embedded schedules
/// first, then playlist members, then rule routines
pub fn due_items(program: &Program, date: NaiveDate, slot: Slot) -> Vec<String> {
    let mut due: Vec<String> = Vec::new();

    for item in program.items.values() {
        if let Some(schedule) = &item.schedule {
            if schedule.applies_on(date, slot) {
                due.push(item.id.clone());
            }
        }
    }

    for playlist_ref in program.playlists.get(slot) {
        if program.items.contains_key(&playlist_ref.id)
            && !due.iter().any(|id| *id == playlist_ref.id)
        {
            due.push(playlist_ref.id.clone());
        }
    }

    for rule in &program.schedule.rules {
        if !rule.applies_on(date, slot) {
            continue;
        }
        for routine_id in &rule.routines {
            if program.items.contains_key(routine_id) && !due.iter().any(|id| id == routine_id) {
                due.push(routine_id.clone());
            }
        }
    }

    due
}

/// Due item ids for every slot of a date
pub fn due_items_for_date(program: &Program, date: NaiveDate) -> DaySchedule {
    DaySchedule {
        morning: due_items(program, date, Slot::Morning),
        midday: due_items(program, date, Slot::Midday),
        evening: due_items(program, date, Slot::Evening),
    }
}

/// Filter a due list down to what a walkthrough should present: items
/// that still exist, are enabled, and are not one-offs already completed
pub fn pending_items(program: &Program, progress: &Progress, due: &[String]) -> Vec<String> {
    due.iter()
        .filter(|id| {
            let Some(item) = program.items.get(id.as_str()) else {
                return false;
            };
            if !item.enabled {
                return false;
            }
            !(item.one_off && ledger::is_item_completed(progress, program, id.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, PlaylistRef};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn program_with(items: Vec<Item>) -> Program {
        let mut program = Program::default_program();
        for item in items {
            program.items.insert(item.id.clone(), item);
        }
        program
    }

    #[test]
    fn test_weekday_schedule_matches_day_set() {
        let schedule =
            ItemSchedule::weekday(vec![Weekday::Mon, Weekday::Wed], Slot::Morning);
        // 2024-01-01 Monday, 2024-01-02 Tuesday, 2024-01-03 Wednesday
        assert!(schedule.applies_on(date("2024-01-01"), Slot::Morning));
        assert!(!schedule.applies_on(date("2024-01-02"), Slot::Morning));
        assert!(schedule.applies_on(date("2024-01-03"), Slot::Morning));
    }

    #[test]
    fn test_weekday_schedule_requires_matching_slot() {
        let schedule = ItemSchedule::weekday(vec![Weekday::Mon], Slot::Morning);
        assert!(!schedule.applies_on(date("2024-01-01"), Slot::Evening));
    }

    #[test]
    fn test_empty_day_set_never_applies() {
        let schedule = ItemSchedule::weekday(Vec::new(), Slot::Morning);
        for offset in 0..7 {
            let d = date("2024-01-01") + chrono::Days::new(offset);
            assert!(!schedule.applies_on(d, Slot::Morning));
        }
    }

    #[test]
    fn test_interval_schedule_boundaries() {
        let schedule = ItemSchedule::interval(3, "2024-01-01", Slot::Midday);
        assert!(schedule.applies_on(date("2024-01-01"), Slot::Midday));
        assert!(!schedule.applies_on(date("2024-01-02"), Slot::Midday));
        assert!(!schedule.applies_on(date("2024-01-03"), Slot::Midday));
        assert!(schedule.applies_on(date("2024-01-04"), Slot::Midday));
        assert!(schedule.applies_on(date("2024-01-07"), Slot::Midday));
    }

    #[test]
    fn test_interval_before_start_never_applies() {
        let schedule = ItemSchedule::interval(1, "2024-01-10", Slot::Morning);
        assert!(!schedule.applies_on(date("2024-01-09"), Slot::Morning));
        assert!(schedule.applies_on(date("2024-01-10"), Slot::Morning));
    }

    #[test]
    fn test_interval_bad_inputs_never_apply() {
        assert!(!ItemSchedule::interval(0, "2024-01-01", Slot::Morning)
            .applies_on(date("2024-01-01"), Slot::Morning));
        assert!(!ItemSchedule::interval(2, "not-a-date", Slot::Morning)
            .applies_on(date("2024-01-01"), Slot::Morning));
    }

    #[test]
    fn test_unknown_kind_never_applies() {
        let schedule: ItemSchedule =
            serde_json::from_str(r#"{"type":"lunar","slot":"morning"}"#).unwrap();
        assert!(!schedule.applies_on(date("2024-01-01"), Slot::Morning));
    }

    #[test]
    fn test_due_items_from_embedded_schedule() {
        let program = program_with(vec![Item::check("stretch", "Stretch")
            .with_schedule(ItemSchedule::weekday(
                vec![Weekday::Mon, Weekday::Wed],
                Slot::Morning,
            ))]);
        assert_eq!(
            due_items(&program, date("2024-01-01"), Slot::Morning),
            vec!["stretch"]
        );
        // Tuesday
        assert!(due_items(&program, date("2024-01-02"), Slot::Morning).is_empty());
    }

    #[test]
    fn test_playlist_members_apply_every_day() {
        let mut program = program_with(vec![Item::check("water", "Water plants")]);
        program.playlists.midday.push(PlaylistRef::new("water"));
        for offset in 0..5 {
            let d = date("2024-03-01") + chrono::Days::new(offset);
            assert_eq!(due_items(&program, d, Slot::Midday), vec!["water"]);
        }
        assert!(due_items(&program, date("2024-03-01"), Slot::Morning).is_empty());
    }

    #[test]
    fn test_rule_without_slot_applies_everywhere() {
        let mut program = program_with(vec![Item::check("tidy", "Tidy up")]);
        let mut rule = ScheduleRule::weekday(vec![Weekday::Mon], Slot::Morning, vec!["tidy".into()]);
        rule.slot = None;
        program.schedule.rules.push(rule);
        assert_eq!(due_items(&program, date("2024-01-01"), Slot::Morning), vec!["tidy"]);
        assert_eq!(due_items(&program, date("2024-01-01"), Slot::Evening), vec!["tidy"]);
    }

    #[test]
    fn test_due_items_deduplicates_across_sources() {
        let mut program = program_with(vec![Item::check("stretch", "Stretch")
            .with_schedule(ItemSchedule::weekday(vec![Weekday::Mon], Slot::Morning))]);
        program.playlists.morning.push(PlaylistRef::new("stretch"));
        program.schedule.rules.push(ScheduleRule::weekday(
            vec![Weekday::Mon],
            Slot::Morning,
            vec!["stretch".into()],
        ));
        let due = due_items(&program, date("2024-01-01"), Slot::Morning);
        assert_eq!(due, vec!["stretch"]);
    }

    #[test]
    fn test_due_items_source_order() {
        let mut program = program_with(vec![
            Item::check("a", "A").with_schedule(ItemSchedule::weekday(
                vec![Weekday::Mon],
                Slot::Morning,
            )),
            Item::check("b", "B"),
            Item::check("c", "C"),
        ]);
        program.playlists.morning.push(PlaylistRef::new("b"));
        program.schedule.rules.push(ScheduleRule::weekday(
            vec![Weekday::Mon],
            Slot::Morning,
            vec!["c".into()],
        ));
        assert_eq!(
            due_items(&program, date("2024-01-01"), Slot::Morning),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let mut program = program_with(vec![Item::check("real", "Real")]);
        program.playlists.morning.push(PlaylistRef::new("ghost"));
        program.playlists.morning.push(PlaylistRef::new("real"));
        program.schedule.rules.push(ScheduleRule::weekday(
            Weekday::ALL.to_vec(),
            Slot::Morning,
            vec!["phantom".into()],
        ));
        assert_eq!(
            due_items(&program, date("2024-01-01"), Slot::Morning),
            vec!["real"]
        );
    }

    #[test]
    fn test_due_items_for_date_covers_all_slots() {
        let mut program = program_with(vec![Item::check("a", "A"), Item::check("b", "B")]);
        program.playlists.morning.push(PlaylistRef::new("a"));
        program.playlists.evening.push(PlaylistRef::new("b"));
        let day = due_items_for_date(&program, date("2024-01-01"));
        assert_eq!(day.morning, vec!["a"]);
        assert!(day.midday.is_empty());
        assert_eq!(day.evening, vec!["b"]);
    }

    #[test]
    fn test_pending_items_filters_disabled_and_completed_one_offs() {
        let mut gift = Item::check("gift", "Buy gift").one_off();
        gift.schedule = Some(ItemSchedule::weekday(Weekday::ALL.to_vec(), Slot::Morning));
        let mut off = Item::check("off", "Disabled");
        off.enabled = false;
        let program = program_with(vec![gift, off, Item::check("keep", "Keep")]);

        let mut progress = Progress::default();
        progress = ledger::record_item_completion(
            &progress,
            "gift",
            Slot::Morning,
            "2024-01-01",
            chrono::Utc::now(),
        );

        let due = vec!["gift".to_string(), "off".to_string(), "keep".to_string()];
        assert_eq!(pending_items(&program, &progress, &due), vec!["keep"]);
    }
}
