//! Import / Export
//!
//! Whole-document JSON exchange. Export emits `{ program, progress? }`
//! pretty-printed; import accepts the same shape (or a bare program)
//! and either replaces the local documents or merges the program into
//! them.

use serde_json::Value;

use crate::domain::validation::validate_program;
use crate::domain::{DomainError, DomainResult, Program, Progress, Slot};

/// How an imported document is combined with local data
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Wholesale substitution of the program (and progress, if included)
    Replace,
    /// Item/playlist/rule merge with the import winning on collisions
    Merge,
}

/// A parsed, gated import document
#[derive(Debug, Clone)]
pub struct ImportBundle {
    pub program: Program,
    pub progress: Option<Progress>,
}

/// Pretty-printed `{ program, progress? }`
pub fn export_json(program: &Program, progress: Option<&Progress>) -> DomainResult<String> {
    let mut document = serde_json::Map::new();
    document.insert(
        "program".to_string(),
        serde_json::to_value(program).map_err(|e| DomainError::Parse(e.to_string()))?,
    );
    if let Some(progress) = progress {
        document.insert(
            "progress".to_string(),
            serde_json::to_value(progress).map_err(|e| DomainError::Parse(e.to_string()))?,
        );
    }
    serde_json::to_string_pretty(&Value::Object(document))
        .map_err(|e| DomainError::Parse(e.to_string()))
}

/// Parse an import document: `{"program": …}` or the program directly,
/// with an optional progress alongside. The program passes the
/// structural gate before anything is accepted; a progress that does
/// not parse is dropped silently (it was never validated historically).
pub fn parse_import(json: &str) -> DomainResult<ImportBundle> {
    let data: Value = serde_json::from_str(json).map_err(|e| DomainError::Parse(e.to_string()))?;

    let program_value = match data.get("program") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => data.clone(),
    };
    validate_program(&program_value).map_err(|error| DomainError::Validation(vec![error]))?;
    let mut program: Program =
        serde_json::from_value(program_value).map_err(|e| DomainError::Parse(e.to_string()))?;

    // older exports predate the theme setting
    if program.settings.theme.is_empty() {
        program.settings.theme = "lofi".to_string();
    }

    let progress = data
        .get("progress")
        .and_then(|value| serde_json::from_value(value.clone()).ok());

    Ok(ImportBundle { program, progress })
}

/// Merge an imported program into the local one:
/// items by id with the import winning, playlists unioned per slot with
/// existing entries kept, rule lists concatenated, override and content
/// maps unioned with the import winning. Local settings and version are
/// untouched.
pub fn merge_programs(local: &Program, imported: &Program) -> Program {
    let mut merged = local.clone();

    for (id, item) in &imported.items {
        merged.items.insert(id.clone(), item.clone());
    }

    for slot in Slot::ALL {
        let existing: Vec<String> = merged
            .playlists
            .get(slot)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let target = merged.playlists.get_mut(slot);
        for playlist_ref in imported.playlists.get(slot) {
            if !existing.contains(&playlist_ref.id) {
                target.push(playlist_ref.clone());
            }
        }
    }

    merged
        .schedule
        .rules
        .extend(imported.schedule.rules.iter().cloned());
    for (key, value) in &imported.schedule.overrides {
        merged.schedule.overrides.insert(key.clone(), value.clone());
    }
    for (key, value) in &imported.content.exercises {
        merged.content.exercises.insert(key.clone(), value.clone());
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutate::add_item;
    use crate::domain::{Item, PlaylistRef, ScheduleRule, Weekday};

    fn program_ab() -> Program {
        let mut program = Program::default_program();
        program = add_item(&program, Item::check("a", "A local"));
        program = add_item(&program, Item::check("b", "B local"));
        program
    }

    #[test]
    fn test_export_import_replace_round_trip() {
        let mut program = program_ab();
        program.playlists.morning.push(PlaylistRef::new("a"));
        program.schedule.rules.push(ScheduleRule::weekday(
            vec![Weekday::Mon],
            Slot::Morning,
            vec!["b".into()],
        ));

        let exported = export_json(&program, None).unwrap();
        let bundle = parse_import(&exported).unwrap();
        assert_eq!(bundle.program, program);
        assert!(bundle.progress.is_none());
    }

    #[test]
    fn test_export_includes_progress_on_request() {
        let program = program_ab();
        let progress = Progress::default();
        let without = export_json(&program, None).unwrap();
        assert!(!without.contains("\"progress\""));
        let with = export_json(&program, Some(&progress)).unwrap();
        assert!(with.contains("\"progress\""));
        assert!(parse_import(&with).unwrap().progress.is_some());
    }

    #[test]
    fn test_import_accepts_bare_program() {
        let raw = serde_json::to_string(&program_ab()).unwrap();
        let bundle = parse_import(&raw).unwrap();
        assert_eq!(bundle.program.items.len(), 2);
    }

    #[test]
    fn test_import_rejects_invalid_documents() {
        assert!(matches!(
            parse_import("not json"),
            Err(DomainError::Parse(_))
        ));
        assert!(matches!(
            parse_import(r#"{"version": 1, "items": {}, "playlists": {}}"#),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_items_import_wins() {
        let local = program_ab();
        let mut imported = Program::default_program();
        imported = add_item(&imported, Item::check("b", "B imported"));
        imported = add_item(&imported, Item::check("c", "C imported"));

        let merged = merge_programs(&local, &imported);
        assert_eq!(merged.items.len(), 3);
        assert_eq!(merged.items["a"].title, "A local");
        assert_eq!(merged.items["b"].title, "B imported");
        assert_eq!(merged.items["c"].title, "C imported");
    }

    #[test]
    fn test_merge_playlists_dedup_append() {
        let mut local = program_ab();
        local.playlists.morning.push(PlaylistRef::new("a"));
        let mut imported = Program::default_program();
        imported.playlists.morning.push(PlaylistRef::new("a"));
        imported.playlists.morning.push(PlaylistRef::new("c"));

        let merged = merge_programs(&local, &imported);
        assert_eq!(
            merged.playlists.morning,
            vec![PlaylistRef::new("a"), PlaylistRef::new("c")]
        );
    }

    #[test]
    fn test_merge_concatenates_rules_without_dedup() {
        let rule_a = ScheduleRule::weekday(vec![Weekday::Mon], Slot::Morning, vec!["a".into()]);
        let rule_b = ScheduleRule::weekday(vec![Weekday::Mon], Slot::Morning, vec!["a".into()]);
        let mut local = program_ab();
        local.schedule.rules.push(rule_a.clone());
        let mut imported = Program::default_program();
        imported.schedule.rules.push(rule_b.clone());

        let merged = merge_programs(&local, &imported);
        assert_eq!(merged.schedule.rules, vec![rule_a, rule_b]);
    }

    #[test]
    fn test_merge_keeps_local_settings() {
        let mut local = program_ab();
        local.settings.theme = "midnight".to_string();
        let mut imported = Program::default_program();
        imported.settings.theme = "paper".to_string();

        let merged = merge_programs(&local, &imported);
        assert_eq!(merged.settings.theme, "midnight");
    }

    #[test]
    fn test_import_backfills_missing_theme() {
        let mut raw = serde_json::to_value(program_ab()).unwrap();
        raw["settings"]["theme"] = Value::String(String::new());
        let bundle = parse_import(&raw.to_string()).unwrap();
        assert_eq!(bundle.program.settings.theme, "lofi");
    }
}
