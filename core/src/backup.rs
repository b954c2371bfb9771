use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    AppState, BodyLogEntry, Exercise, Food, Goals, GymLogEntry, NutritionLogEntry, UnitPreference,
};

/// Full-state backup document. Every collection key is optional on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default, rename = "exportedAt", skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub unit: Option<UnitPreference>,
    #[serde(default)]
    pub goals: Option<Goals>,
    #[serde(default, rename = "exerciseDB")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(default, rename = "foodDB")]
    pub foods: Option<Vec<Food>>,
    #[serde(default, rename = "gymLog")]
    pub gym_log: Option<Vec<GymLogEntry>>,
    #[serde(default, rename = "nutritionLog")]
    pub nutrition_log: Option<Vec<NutritionLogEntry>>,
    #[serde(default, rename = "bodyLog")]
    pub body_log: Option<Vec<BodyLogEntry>>,
}

/// Which parts of the state a restore replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub unit: bool,
    pub goals: bool,
    pub exercises: Option<usize>,
    pub foods: Option<usize>,
    pub gym_entries: Option<usize>,
    pub nutrition_entries: Option<usize>,
    pub body_entries: Option<usize>,
}

impl RestoreSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Snapshot every key of `state`.
#[must_use]
pub fn export_backup(state: &AppState) -> BackupData {
    BackupData {
        exported_at: Some(Local::now().to_rfc3339()),
        unit: Some(state.unit),
        goals: Some(state.goals.clone()),
        exercises: Some(state.exercises.clone()),
        foods: Some(state.foods.clone()),
        gym_log: Some(state.gym_log.clone()),
        nutrition_log: Some(state.nutrition_log.clone()),
        body_log: Some(state.body_log.clone()),
    }
}

pub fn to_json(backup: &BackupData) -> Result<String> {
    serde_json::to_string_pretty(backup).context("Failed to serialize backup")
}

/// Parse a backup document in full. Nothing is applied here, so a rejected
/// document cannot leave state half-restored.
pub fn parse_backup<R: Read>(reader: R) -> Result<BackupData> {
    let value: Value = serde_json::from_reader(reader).context("Backup is not valid JSON")?;
    if !value.is_object() {
        bail!("Backup must be a JSON object");
    }
    serde_json::from_value(value).context("Backup has an unexpected shape")
}

/// Replace each collection present in `backup`; absent keys are left untouched.
pub fn apply_backup(state: &mut AppState, backup: BackupData) -> RestoreSummary {
    let mut summary = RestoreSummary::default();
    if let Some(unit) = backup.unit {
        state.unit = unit;
        summary.unit = true;
    }
    if let Some(goals) = backup.goals {
        state.goals = goals;
        summary.goals = true;
    }
    if let Some(exercises) = backup.exercises {
        summary.exercises = Some(exercises.len());
        state.exercises = exercises;
    }
    if let Some(foods) = backup.foods {
        summary.foods = Some(foods.len());
        state.foods = foods;
    }
    if let Some(gym_log) = backup.gym_log {
        summary.gym_entries = Some(gym_log.len());
        state.gym_log = gym_log;
    }
    if let Some(nutrition_log) = backup.nutrition_log {
        summary.nutrition_entries = Some(nutrition_log.len());
        state.nutrition_log = nutrition_log;
    }
    if let Some(body_log) = backup.body_log {
        summary.body_entries = Some(body_log.len());
        state.body_log = body_log;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AppState {
        let mut state = AppState::seeded();
        state.unit = UnitPreference::Imperial;
        state.goals.protein = 150.0;
        state.gym_log.push(GymLogEntry {
            id: "g1".to_string(),
            date: "2025-07-01".to_string(),
            exercise_id: state.exercises[0].id.clone(),
            sets: 3.0,
            reps: 10.0,
            weight: 50.0,
            notes: "felt \"good\", strong".to_string(),
        });
        state.body_log.push(BodyLogEntry {
            id: "b1".to_string(),
            date: "2025-07-01".to_string(),
            weight: 80.5,
            height: 180.0,
            muscle: 42.0,
            fat: 17.5,
            waist: 84.0,
            arms: 36.0,
            chest: 101.0,
            notes: String::new(),
        });
        state
    }

    #[test]
    fn test_backup_round_trip() {
        let state = sample_state();
        let json = to_json(&export_backup(&state)).unwrap();

        let mut restored = AppState::default();
        let summary = apply_backup(&mut restored, parse_backup(json.as_bytes()).unwrap());
        assert_eq!(restored, state);
        assert!(summary.unit);
        assert!(summary.goals);
        assert_eq!(summary.exercises, Some(3));
        assert_eq!(summary.gym_entries, Some(1));
        assert_eq!(summary.nutrition_entries, Some(0));
    }

    #[test]
    fn test_export_uses_layout_keys() {
        let json = to_json(&export_backup(&sample_state())).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        for key in [
            "unit",
            "goals",
            "exerciseDB",
            "foodDB",
            "gymLog",
            "nutritionLog",
            "bodyLog",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["unit"], "imperial");
        assert!(value["gymLog"][0].get("exerciseId").is_some());
    }

    #[test]
    fn test_partial_restore_leaves_other_keys() {
        let mut state = sample_state();
        let backup = parse_backup(r#"{"foodDB": [{"id": "f9", "name": "Rice", "calories": "130"}]}"#.as_bytes()).unwrap();
        let summary = apply_backup(&mut state, backup);

        assert_eq!(state.foods.len(), 1);
        assert!((state.foods[0].calories - 130.0).abs() < f64::EPSILON);
        assert_eq!(state.gym_log.len(), 1);
        assert_eq!(state.unit, UnitPreference::Imperial);
        assert!(!summary.unit);
        assert_eq!(summary.foods, Some(1));
        assert_eq!(summary.gym_entries, None);
    }

    #[test]
    fn test_null_keys_are_ignored() {
        let backup = parse_backup(r#"{"gymLog": null, "unit": null}"#.as_bytes()).unwrap();
        let mut state = sample_state();
        let before = state.clone();
        let summary = apply_backup(&mut state, backup);
        assert!(summary.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_malformed_backups_rejected() {
        assert!(parse_backup("{not json".as_bytes()).is_err());
        assert!(parse_backup("[1, 2]".as_bytes()).is_err());
        assert!(parse_backup(r#"{"gymLog": {"id": "x"}}"#.as_bytes()).is_err());
        assert!(parse_backup(r#"{"unit": "furlongs"}"#.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_object_restores_nothing() {
        let backup = parse_backup("{}".as_bytes()).unwrap();
        let mut state = sample_state();
        let before = state.clone();
        assert!(apply_backup(&mut state, backup).is_empty());
        assert_eq!(state, before);
    }
}
