use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::aggregate::{
    self, DayDetails, GymSession, InsightPoint, MaxWeightPoint, NutritionDay, NutritionPoint,
    Overview, PlanProgress, PlanWindow, VolumePoint,
};
use crate::backup::{self, BackupData, RestoreSummary};
use crate::calendar::{self, Week};
use crate::csv_export;
use crate::food_import::{self, FoodImportSummary};
use crate::lookup::Lookup;
use crate::models::{
    AppState, BodyLogEntry, Exercise, ExerciseTag, Food, Goals, GymLogEntry, NewBodyEntry,
    NewFood, NewGymEntry, NewNutritionEntry, NutritionLogEntry, UnitPreference, format_date,
    new_id, validate_body_entry, validate_food, validate_gym_entry, validate_name,
};
use crate::store::{Store, keys};

/// Owns the application state and its store.
///
/// Every mutation replaces whole records in memory, then writes the touched
/// key back. Persistence is best effort: a failed write is logged and the
/// in-memory change stands. Derived views are recomputed on each call.
pub struct TrackerService {
    store: Store,
    state: AppState,
    plan: PlanWindow,
}

impl TrackerService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let store = Store::open(db_path)?;
        Self::with_store(store)
    }

    pub fn new_in_memory() -> Result<Self> {
        Self::with_store(Store::open_in_memory()?)
    }

    fn with_store(store: Store) -> Result<Self> {
        let state = store.load_state()?;
        Ok(Self {
            store,
            state,
            plan: PlanWindow::default(),
        })
    }

    #[must_use]
    pub fn with_plan(mut self, plan: PlanWindow) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn plan(&self) -> &PlanWindow {
        &self.plan
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.store.save(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist change");
        }
    }

    // --- Exercises ---

    pub fn add_exercise(&mut self, name: &str, tags: &[ExerciseTag]) -> Result<Exercise> {
        let exercise = Exercise {
            id: new_id(),
            name: validate_name("Exercise", name)?,
            tags: tags.iter().copied().collect(),
        };
        self.state.exercises.insert(0, exercise.clone());
        self.persist(keys::EXERCISES, &self.state.exercises);
        tracing::info!(id = %exercise.id, name = %exercise.name, "Added exercise");
        Ok(exercise)
    }

    /// Log entries that reference the exercise are kept and show as unknown.
    pub fn remove_exercise(&mut self, id: &str) -> bool {
        let before = self.state.exercises.len();
        self.state.exercises.retain(|e| e.id != id);
        let removed = self.state.exercises.len() != before;
        if removed {
            self.persist(keys::EXERCISES, &self.state.exercises);
            tracing::info!(id, "Removed exercise");
        }
        removed
    }

    /// Flip one tag on an exercise. `None` when the exercise does not exist.
    pub fn toggle_exercise_tag(&mut self, id: &str, tag: ExerciseTag) -> Option<Exercise> {
        let exercise = self.state.exercises.iter_mut().find(|e| e.id == id)?;
        exercise.toggle_tag(tag);
        let updated = exercise.clone();
        self.persist(keys::EXERCISES, &self.state.exercises);
        tracing::info!(id, tag = tag.key(), on = updated.has_tag(tag), "Toggled tag");
        Some(updated)
    }

    #[must_use]
    pub fn list_exercises(&self, tag: Option<ExerciseTag>, query: Option<&str>) -> Vec<&Exercise> {
        aggregate::filter_exercises(&self.state.exercises, tag, query)
    }

    // --- Foods ---

    pub fn add_food(&mut self, food: &NewFood) -> Result<Food> {
        validate_food(food)?;
        let food = Food {
            id: new_id(),
            name: validate_name("Food", &food.name)?,
            calories: food.calories,
            protein: food.protein,
            carbs: food.carbs,
            fat: food.fat,
        };
        self.state.foods.insert(0, food.clone());
        self.persist(keys::FOODS, &self.state.foods);
        tracing::info!(id = %food.id, name = %food.name, "Added food");
        Ok(food)
    }

    pub fn remove_food(&mut self, id: &str) -> bool {
        let before = self.state.foods.len();
        self.state.foods.retain(|f| f.id != id);
        let removed = self.state.foods.len() != before;
        if removed {
            self.persist(keys::FOODS, &self.state.foods);
            tracing::info!(id, "Removed food");
        }
        removed
    }

    #[must_use]
    pub fn list_foods(&self, query: Option<&str>) -> Vec<&Food> {
        aggregate::filter_foods(&self.state.foods, query)
    }

    /// Import foods from a JSON file. When `dry_run` is true nothing is written.
    pub fn import_foods<R: Read>(&mut self, reader: R, dry_run: bool) -> Result<FoodImportSummary> {
        let rows = food_import::parse_food_file(reader)?;
        let summary = food_import::import_foods(&mut self.state.foods, &rows, dry_run);
        if !dry_run && summary.added > 0 {
            self.persist(keys::FOODS, &self.state.foods);
        }
        tracing::info!(
            added = summary.added,
            duplicates = summary.skipped_duplicates,
            invalid = summary.skipped_invalid,
            dry_run,
            "Imported foods"
        );
        Ok(summary)
    }

    // --- Gym log ---

    pub fn log_workout(&mut self, entry: &NewGymEntry) -> Result<GymLogEntry> {
        validate_gym_entry(entry)?;
        if self.state.exercises.resolve(&entry.exercise_id).is_none() {
            tracing::warn!(exercise_id = %entry.exercise_id, "Logging workout for unknown exercise");
        }
        let record = GymLogEntry {
            id: new_id(),
            date: format_date(entry.date),
            exercise_id: entry.exercise_id.clone(),
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            notes: entry.notes.clone().unwrap_or_default(),
        };
        self.state.gym_log.insert(0, record.clone());
        self.persist(keys::GYM_LOG, &self.state.gym_log);
        tracing::info!(id = %record.id, date = %record.date, "Logged workout");
        Ok(record)
    }

    pub fn delete_gym_entry(&mut self, id: &str) -> bool {
        let before = self.state.gym_log.len();
        self.state.gym_log.retain(|e| e.id != id);
        let removed = self.state.gym_log.len() != before;
        if removed {
            self.persist(keys::GYM_LOG, &self.state.gym_log);
            tracing::info!(id, "Deleted gym entry");
        }
        removed
    }

    // --- Nutrition log ---

    /// Log a serving of a food. Calories and protein are computed from the
    /// food as it is now and stored on the entry.
    pub fn log_food(&mut self, entry: &NewNutritionEntry) -> Result<NutritionLogEntry> {
        let qty = entry.qty.filter(|q| *q > 0.0).unwrap_or(1.0);
        let (calories, protein) = match self.state.foods.resolve(&entry.food_id) {
            Some(food) => ((food.calories * qty).round(), food.protein * qty),
            None => {
                tracing::warn!(food_id = %entry.food_id, "Logging unknown food with zero values");
                (0.0, 0.0)
            }
        };
        let record = NutritionLogEntry {
            id: new_id(),
            date: format_date(entry.date),
            food_id: entry.food_id.clone(),
            qty,
            calories,
            protein,
            notes: entry.notes.clone().unwrap_or_default(),
        };
        self.state.nutrition_log.insert(0, record.clone());
        self.persist(keys::NUTRITION_LOG, &self.state.nutrition_log);
        tracing::info!(id = %record.id, date = %record.date, calories, "Logged food");
        Ok(record)
    }

    pub fn delete_nutrition_entry(&mut self, id: &str) -> bool {
        let before = self.state.nutrition_log.len();
        self.state.nutrition_log.retain(|e| e.id != id);
        let removed = self.state.nutrition_log.len() != before;
        if removed {
            self.persist(keys::NUTRITION_LOG, &self.state.nutrition_log);
            tracing::info!(id, "Deleted nutrition entry");
        }
        removed
    }

    // --- Body log ---

    pub fn log_body(&mut self, entry: &NewBodyEntry) -> Result<BodyLogEntry> {
        validate_body_entry(entry)?;
        let record = BodyLogEntry {
            id: new_id(),
            date: format_date(entry.date),
            weight: entry.weight,
            height: entry.height,
            muscle: entry.muscle,
            fat: entry.fat,
            waist: entry.waist,
            arms: entry.arms,
            chest: entry.chest,
            notes: entry.notes.clone().unwrap_or_default(),
        };
        self.state.body_log.insert(0, record.clone());
        self.persist(keys::BODY_LOG, &self.state.body_log);
        tracing::info!(id = %record.id, date = %record.date, "Logged body measurement");
        Ok(record)
    }

    pub fn delete_body_entry(&mut self, id: &str) -> bool {
        let before = self.state.body_log.len();
        self.state.body_log.retain(|e| e.id != id);
        let removed = self.state.body_log.len() != before;
        if removed {
            self.persist(keys::BODY_LOG, &self.state.body_log);
            tracing::info!(id, "Deleted body entry");
        }
        removed
    }

    // --- Settings ---

    pub fn set_unit(&mut self, unit: UnitPreference) {
        self.state.unit = unit;
        self.persist(keys::UNIT, &self.state.unit);
        tracing::info!(%unit, "Set unit preference");
    }

    pub fn set_goals(&mut self, goals: Goals) {
        self.state.goals = goals;
        self.persist(keys::GOALS, &self.state.goals);
        tracing::info!(
            calories = self.state.goals.calories,
            protein = self.state.goals.protein,
            weight = self.state.goals.weight,
            "Set goals"
        );
    }

    // --- Backup ---

    #[must_use]
    pub fn export_backup(&self) -> BackupData {
        backup::export_backup(&self.state)
    }

    /// Restore from a backup document. A malformed document changes nothing.
    pub fn restore_backup<R: Read>(&mut self, reader: R) -> Result<RestoreSummary> {
        let data = backup::parse_backup(reader)?;
        let summary = backup::apply_backup(&mut self.state, data);
        if summary.unit {
            self.persist(keys::UNIT, &self.state.unit);
        }
        if summary.goals {
            self.persist(keys::GOALS, &self.state.goals);
        }
        if summary.exercises.is_some() {
            self.persist(keys::EXERCISES, &self.state.exercises);
        }
        if summary.foods.is_some() {
            self.persist(keys::FOODS, &self.state.foods);
        }
        if summary.gym_entries.is_some() {
            self.persist(keys::GYM_LOG, &self.state.gym_log);
        }
        if summary.nutrition_entries.is_some() {
            self.persist(keys::NUTRITION_LOG, &self.state.nutrition_log);
        }
        if summary.body_entries.is_some() {
            self.persist(keys::BODY_LOG, &self.state.body_log);
        }
        tracing::info!(?summary, "Restored backup");
        Ok(summary)
    }

    // --- CSV export ---

    pub fn export_gym_csv<W: Write>(&self, out: W) -> Result<usize> {
        csv_export::write_gym_csv(out, &self.state.gym_log, &self.state.exercises)
    }

    pub fn export_nutrition_csv<W: Write>(&self, out: W) -> Result<usize> {
        csv_export::write_nutrition_csv(out, &self.state.nutrition_log, &self.state.foods)
    }

    pub fn export_body_csv<W: Write>(&self, out: W) -> Result<usize> {
        csv_export::write_body_csv(out, &self.state.body_log)
    }

    // --- Derived views ---

    #[must_use]
    pub fn dates_with_data(&self) -> BTreeSet<String> {
        let state = &self.state;
        let index = aggregate::index_by_date(&state.gym_log, &state.nutrition_log, &state.body_log);
        tracing::debug!(dates = index.len(), "Rebuilt date index");
        aggregate::dates_with_data(&index)
    }

    #[must_use]
    pub fn gym_volume_series(&self) -> Vec<VolumePoint> {
        aggregate::gym_volume_by_date(&self.state.gym_log)
    }

    #[must_use]
    pub fn gym_max_weight_series(&self) -> Vec<MaxWeightPoint> {
        aggregate::gym_max_weight_by_date(&self.state.gym_log)
    }

    #[must_use]
    pub fn nutrition_series(&self) -> Vec<NutritionPoint> {
        aggregate::nutrition_by_date(&self.state.nutrition_log)
    }

    #[must_use]
    pub fn body_trend(&self) -> Vec<BodyLogEntry> {
        aggregate::body_trend(&self.state.body_log)
    }

    #[must_use]
    pub fn insights(&self) -> Vec<InsightPoint> {
        let state = &self.state;
        aggregate::insight_series(&state.gym_log, &state.nutrition_log, &state.body_log)
    }

    #[must_use]
    pub fn plan_progress(&self) -> PlanProgress {
        aggregate::plan_progress(&self.plan, &self.state.gym_log)
    }

    #[must_use]
    pub fn top_weights(&self) -> HashMap<String, f64> {
        aggregate::top_weight_by_exercise(&self.state.gym_log)
    }

    #[must_use]
    pub fn gym_sessions(&self) -> Vec<GymSession> {
        aggregate::gym_sessions(&self.state.gym_log, &self.state.exercises)
    }

    #[must_use]
    pub fn nutrition_days(&self) -> Vec<NutritionDay> {
        aggregate::nutrition_days(&self.state.nutrition_log)
    }

    #[must_use]
    pub fn day_details(&self, date: &str) -> Option<DayDetails> {
        aggregate::day_details(&self.state, date)
    }

    #[must_use]
    pub fn overview(&self, today: &str) -> Overview {
        aggregate::overview(&self.state, today, &self.plan)
    }

    #[allow(clippy::unused_self)]
    pub fn month_matrix(&self, year: i32, month: u32) -> Result<Vec<Week>> {
        calendar::month_matrix(year, month)
    }

    pub fn active_days(&self, year: i32, month: u32) -> Result<BTreeSet<u32>> {
        calendar::active_days_in_month(&self.dates_with_data(), year, month)
    }

    #[must_use]
    pub fn active_days_in_year(&self, year: i32) -> BTreeMap<u32, BTreeSet<u32>> {
        calendar::active_days_in_year(&self.dates_with_data(), year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(exercise_id: &str, day: NaiveDate, sets: f64, reps: f64, weight: f64) -> NewGymEntry {
        NewGymEntry {
            date: day,
            exercise_id: exercise_id.to_string(),
            sets,
            reps,
            weight,
            notes: None,
        }
    }

    #[test]
    fn test_new_service_is_seeded() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert_eq!(svc.state().exercises.len(), 3);
        assert_eq!(svc.state().foods.len(), 2);
        assert_eq!(svc.plan(), &PlanWindow::default());
    }

    #[test]
    fn test_add_and_remove_exercise() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let ex = svc.add_exercise("  Deadlift ", &[ExerciseTag::Back]).unwrap();
        assert_eq!(ex.name, "Deadlift");
        assert!(ex.has_tag(ExerciseTag::Back));
        assert_eq!(svc.list_exercises(Some(ExerciseTag::Back), None).len(), 2);

        assert!(svc.add_exercise("   ", &[]).is_err());

        assert!(svc.remove_exercise(&ex.id));
        assert!(!svc.remove_exercise(&ex.id));
    }

    #[test]
    fn test_toggle_tag() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let id = svc.state().exercises[0].id.clone();
        let on = svc.toggle_exercise_tag(&id, ExerciseTag::Triceps).unwrap();
        assert!(on.has_tag(ExerciseTag::Triceps));
        let off = svc.toggle_exercise_tag(&id, ExerciseTag::Triceps).unwrap();
        assert!(!off.has_tag(ExerciseTag::Triceps));
        assert!(svc.toggle_exercise_tag("missing", ExerciseTag::Core).is_none());
    }

    #[test]
    fn test_log_food_computes_once() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let egg = svc.state().foods[1].clone();
        let entry = svc
            .log_food(&NewNutritionEntry {
                date: date(2025, 7, 1),
                food_id: egg.id.clone(),
                qty: Some(2.5),
                notes: None,
            })
            .unwrap();
        assert!((entry.calories - 195.0).abs() < f64::EPSILON);
        assert!((entry.protein - 15.0).abs() < f64::EPSILON);

        // Removing the food leaves the logged values in place
        assert!(svc.remove_food(&egg.id));
        let days = svc.nutrition_days();
        assert!((days[0].calories - 195.0).abs() < f64::EPSILON);
        let details = svc.day_details("2025-07-01").unwrap();
        assert_eq!(details.food[0].food, crate::lookup::UNKNOWN_NAME);
    }

    #[test]
    fn test_log_food_qty_defaults_to_one() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let chicken_id = svc.state().foods[0].id.clone();
        for qty in [None, Some(0.0), Some(-2.0)] {
            let entry = svc
                .log_food(&NewNutritionEntry {
                    date: date(2025, 7, 1),
                    food_id: chicken_id.clone(),
                    qty,
                    notes: None,
                })
                .unwrap();
            assert!((entry.qty - 1.0).abs() < f64::EPSILON);
            assert!((entry.calories - 165.0).abs() < f64::EPSILON);
        }
        let unknown = svc
            .log_food(&NewNutritionEntry {
                date: date(2025, 7, 1),
                food_id: "nope".to_string(),
                qty: Some(3.0),
                notes: None,
            })
            .unwrap();
        assert!(unknown.calories.abs() < f64::EPSILON);
    }

    #[test]
    fn test_workouts_prepended_and_aggregated() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let bench = svc.state().exercises[0].id.clone();
        let first = svc.log_workout(&workout(&bench, date(2025, 7, 1), 3.0, 10.0, 50.0)).unwrap();
        let second = svc.log_workout(&workout(&bench, date(2025, 7, 1), 3.0, 8.0, 55.0)).unwrap();
        assert_eq!(svc.state().gym_log[0].id, second.id);
        assert_eq!(svc.state().gym_log[1].id, first.id);

        let volume = svc.gym_volume_series();
        assert!((volume[0].volume - 2820.0).abs() < f64::EPSILON);
        assert!((svc.gym_max_weight_series()[0].max_weight - 55.0).abs() < f64::EPSILON);
        assert!((svc.top_weights()[&bench] - 55.0).abs() < f64::EPSILON);
        assert_eq!(svc.gym_sessions()[0].exercises[0].entries.len(), 2);

        assert!(svc.log_workout(&workout(&bench, date(2025, 7, 1), -1.0, 8.0, 55.0)).is_err());

        assert!(svc.delete_gym_entry(&first.id));
        assert!(!svc.delete_gym_entry(&first.id));
        assert_eq!(svc.state().gym_log.len(), 1);
    }

    #[test]
    fn test_plan_uses_configured_window() {
        let mut svc = TrackerService::new_in_memory().unwrap().with_plan(PlanWindow {
            start: date(2025, 7, 1),
            end: date(2025, 7, 14),
            sessions_per_week: 3,
        });
        let squat = svc.state().exercises[1].id.clone();
        for d in [1, 3, 5, 8, 14] {
            svc.log_workout(&workout(&squat, date(2025, 7, d), 5.0, 5.0, 100.0))
                .unwrap();
        }
        let progress = svc.plan_progress();
        assert_eq!(progress.target, 6);
        assert_eq!(progress.actual, 5);
    }

    #[test]
    fn test_body_log_and_calendar() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let entry = svc
            .log_body(&NewBodyEntry {
                date: date(2025, 7, 20),
                weight: 80.0,
                fat: 18.0,
                ..NewBodyEntry::default()
            })
            .unwrap();
        assert!(
            svc.log_body(&NewBodyEntry {
                date: date(2025, 7, 20),
                fat: 120.0,
                ..NewBodyEntry::default()
            })
            .is_err()
        );
        assert_eq!(svc.body_trend().len(), 1);
        assert_eq!(svc.insights()[0].weight, Some(80.0));

        let active = svc.active_days(2025, 7).unwrap();
        assert!(active.contains(&20));
        assert_eq!(svc.month_matrix(2025, 7).unwrap().len(), 5);

        let year = svc.active_days_in_year(2025);
        assert_eq!(year.len(), 12);
        assert!(year[&7].contains(&20));
        assert!(year[&6].is_empty());

        assert!(svc.delete_body_entry(&entry.id));
        assert!(svc.active_days(2025, 7).unwrap().is_empty());
    }

    #[test]
    fn test_overview_goals() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        svc.set_goals(Goals {
            calories: 2000.0,
            protein: 150.0,
            weight: 75.0,
        });
        let chicken_id = svc.state().foods[0].id.clone();
        svc.log_food(&NewNutritionEntry {
            date: date(2025, 7, 1),
            food_id: chicken_id,
            qty: Some(3.0),
            notes: None,
        })
        .unwrap();
        let view = svc.overview("2025-07-01");
        assert!((view.calories - 495.0).abs() < f64::EPSILON);
        assert_eq!(view.calories_goal_pct, Some(25));
        assert!((view.target_weight - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_import_foods_dry_run_and_real() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let file = r#"{"foods":[{"name":"Oats","kcal":389,"proteins":17}]}"#;
        let dry = svc.import_foods(file.as_bytes(), true).unwrap();
        assert_eq!(dry.added, 1);
        assert_eq!(svc.state().foods.len(), 2);

        let real = svc.import_foods(file.as_bytes(), false).unwrap();
        assert_eq!(real.added, 1);
        assert_eq!(svc.list_foods(Some("oat")).len(), 1);

        let again = svc.import_foods(file.as_bytes(), false).unwrap();
        assert_eq!(again.added, 0);
        assert_eq!(again.skipped_duplicates, 1);
    }

    #[test]
    fn test_restore_rejects_malformed_and_keeps_state() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let before = svc.state().clone();
        assert!(svc.restore_backup("{oops".as_bytes()).is_err());
        assert!(svc.restore_backup(r#"{"foodDB": 3}"#.as_bytes()).is_err());
        assert_eq!(svc.state(), &before);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitlog.db");
        let logged_id = {
            let mut svc = TrackerService::new(&path).unwrap();
            svc.set_unit(UnitPreference::Imperial);
            let bench = svc.state().exercises[0].id.clone();
            svc.log_workout(&workout(&bench, date(2025, 7, 2), 3.0, 5.0, 60.0))
                .unwrap()
                .id
        };

        let svc = TrackerService::new(&path).unwrap();
        assert_eq!(svc.state().unit, UnitPreference::Imperial);
        assert_eq!(svc.state().gym_log[0].id, logged_id);
        assert_eq!(svc.state().exercises.len(), 3);
    }

    #[test]
    fn test_backup_restore_between_services() {
        let mut source = TrackerService::new_in_memory().unwrap();
        let squat = source.state().exercises[1].id.clone();
        source
            .log_workout(&workout(&squat, date(2025, 7, 3), 5.0, 5.0, 120.0))
            .unwrap();
        let json = backup::to_json(&source.export_backup()).unwrap();

        let mut target = TrackerService::new_in_memory().unwrap();
        let summary = target.restore_backup(json.as_bytes()).unwrap();
        assert_eq!(summary.gym_entries, Some(1));
        assert_eq!(target.state(), source.state());
    }

    #[test]
    fn test_csv_exports() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let bench = svc.state().exercises[0].id.clone();
        svc.log_workout(&NewGymEntry {
            notes: Some("tough, but ok".to_string()),
            ..workout(&bench, date(2025, 7, 1), 3.0, 10.0, 50.0)
        })
        .unwrap();
        let mut out = Vec::new();
        assert_eq!(svc.export_gym_csv(&mut out).unwrap(), 1);
        let rows = csv_export::read_csv_rows(out.as_slice()).unwrap();
        assert_eq!(rows[0][1], "Bench Press");
        assert_eq!(rows[0][5], "tough, but ok");

        let mut out = Vec::new();
        assert_eq!(svc.export_nutrition_csv(&mut out).unwrap(), 0);
        let mut out = Vec::new();
        assert_eq!(svc.export_body_csv(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let bench = svc.state().exercises[0].id.clone();
        assert!(
            svc.log_workout(&workout(&bench, date(2025, 7, 1), 3.0, 10.0, f64::NAN))
                .is_err()
        );
        assert!(
            svc.log_workout(&workout(&bench, date(2025, 7, 1), f64::INFINITY, 10.0, 50.0))
                .is_err()
        );
        assert!(svc.gym_volume_series().is_empty());

        let err = svc
            .add_food(&NewFood {
                name: "Mystery".to_string(),
                calories: f64::INFINITY,
                protein: 0.0,
                carbs: 0.0,
                fat: 0.0,
            })
            .unwrap_err();
        assert!(err.to_string().contains("calories"));
        assert_eq!(svc.state().foods.len(), 2);

        assert!(
            svc.log_body(&NewBodyEntry {
                date: date(2025, 7, 1),
                weight: f64::NEG_INFINITY,
                ..NewBodyEntry::default()
            })
            .is_err()
        );
        assert!(svc.body_trend().is_empty());
    }

    #[test]
    fn test_new_library_records_come_first() {
        let mut svc = TrackerService::new_in_memory().unwrap();
        let ex = svc.add_exercise("Deadlift", &[]).unwrap();
        assert_eq!(svc.state().exercises[0].id, ex.id);
        assert_eq!(svc.state().exercises.len(), 4);

        let food = svc
            .add_food(&NewFood {
                name: "Oats".to_string(),
                calories: 150.0,
                protein: 5.0,
                carbs: 27.0,
                fat: 3.0,
            })
            .unwrap();
        assert_eq!(svc.state().foods[0].id, food.id);
    }
}
