//! Derived views over the record collections.
//!
//! Every function here is a pure fold over borrowed slices: no I/O, no shared
//! state, same input same output. Callers recompute from the full current
//! snapshot after each mutation.
//!
//! Date ordering relies on the fixed `YYYY-MM-DD` text form, so plain string
//! ordering is chronological ordering.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::lookup::{Lookup, UNKNOWN_NAME};
use crate::models::{
    AppState, BodyLogEntry, Exercise, ExerciseTag, Food, GymLogEntry, NutritionLogEntry,
    parse_date,
};

// --- Per-date index ---

/// Everything logged on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub gym_entries: Vec<GymLogEntry>,
    pub total_calories: f64,
    pub total_protein: f64,
    /// Last body entry seen for the date; earlier duplicates are replaced.
    pub body_entry: Option<BodyLogEntry>,
}

impl DaySummary {
    fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            gym_entries: Vec::new(),
            total_calories: 0.0,
            total_protein: 0.0,
            body_entry: None,
        }
    }
}

fn day_slot<'a>(index: &'a mut BTreeMap<String, DaySummary>, date: &str) -> &'a mut DaySummary {
    index
        .entry(date.to_string())
        .or_insert_with(|| DaySummary::empty(date))
}

/// Fold the three logs into one summary per date that appears in any of them.
#[must_use]
pub fn index_by_date(
    gym: &[GymLogEntry],
    nutrition: &[NutritionLogEntry],
    body: &[BodyLogEntry],
) -> BTreeMap<String, DaySummary> {
    let mut index = BTreeMap::new();
    for entry in gym {
        day_slot(&mut index, &entry.date)
            .gym_entries
            .push(entry.clone());
    }
    for entry in nutrition {
        let day = day_slot(&mut index, &entry.date);
        day.total_calories += entry.calories;
        day.total_protein += entry.protein;
    }
    for entry in body {
        day_slot(&mut index, &entry.date).body_entry = Some(entry.clone());
    }
    index
}

/// Dates that have at least one entry in any log.
#[must_use]
pub fn dates_with_data(index: &BTreeMap<String, DaySummary>) -> BTreeSet<String> {
    index.keys().cloned().collect()
}

// --- Chart series ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub date: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxWeightPoint {
    pub date: String,
    pub max_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionPoint {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
}

#[must_use]
pub fn gym_volume_by_date(gym: &[GymLogEntry]) -> Vec<VolumePoint> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in gym {
        *totals.entry(entry.date.as_str()).or_insert(0.0) += entry.volume();
    }
    totals
        .into_iter()
        .map(|(date, volume)| VolumePoint {
            date: date.to_string(),
            volume,
        })
        .collect()
}

/// Heaviest weight lifted per date, floored at zero.
#[must_use]
pub fn gym_max_weight_by_date(gym: &[GymLogEntry]) -> Vec<MaxWeightPoint> {
    let mut maxima: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in gym {
        let slot = maxima.entry(entry.date.as_str()).or_insert(0.0);
        *slot = slot.max(entry.weight);
    }
    maxima
        .into_iter()
        .map(|(date, max_weight)| MaxWeightPoint {
            date: date.to_string(),
            max_weight,
        })
        .collect()
}

#[must_use]
pub fn nutrition_by_date(nutrition: &[NutritionLogEntry]) -> Vec<NutritionPoint> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for entry in nutrition {
        let slot = totals.entry(entry.date.as_str()).or_insert((0.0, 0.0));
        slot.0 += entry.calories;
        slot.1 += entry.protein;
    }
    totals
        .into_iter()
        .map(|(date, (calories, protein))| NutritionPoint {
            date: date.to_string(),
            calories,
            protein,
        })
        .collect()
}

/// Body log in ascending date order. Same-date entries are all kept, in input order.
#[must_use]
pub fn body_trend(body: &[BodyLogEntry]) -> Vec<BodyLogEntry> {
    let mut sorted = body.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted
}

// --- Cross-metric insights ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightPoint {
    pub date: String,
    pub gym_volume: f64,
    pub calories: f64,
    pub weight: Option<f64>,
}

/// Union of the volume, nutrition, and body series on a shared date axis.
#[must_use]
pub fn insight_series(
    gym: &[GymLogEntry],
    nutrition: &[NutritionLogEntry],
    body: &[BodyLogEntry],
) -> Vec<InsightPoint> {
    let mut merged: BTreeMap<String, InsightPoint> = BTreeMap::new();
    for point in gym_volume_by_date(gym) {
        insight_slot(&mut merged, &point.date).gym_volume = point.volume;
    }
    for point in nutrition_by_date(nutrition) {
        insight_slot(&mut merged, &point.date).calories = point.calories;
    }
    for entry in body_trend(body) {
        insight_slot(&mut merged, &entry.date).weight = Some(entry.weight);
    }
    merged.into_values().collect()
}

fn insight_slot<'a>(
    merged: &'a mut BTreeMap<String, InsightPoint>,
    date: &str,
) -> &'a mut InsightPoint {
    merged
        .entry(date.to_string())
        .or_insert_with(|| InsightPoint {
            date: date.to_string(),
            gym_volume: 0.0,
            calories: 0.0,
            weight: None,
        })
}

// --- Plan completion ---

/// A fixed training plan: a date range and a weekly session target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sessions_per_week: u32,
}

impl Default for PlanWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid plan start"),
            end: NaiveDate::from_ymd_opt(2026, 10, 8).expect("valid plan end"),
            sessions_per_week: 3,
        }
    }
}

impl PlanWindow {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive day span rounded up to whole weeks. Zero for an inverted window.
    #[must_use]
    pub fn total_weeks(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        if span <= 0 {
            return 0;
        }
        u32::try_from((span + 6) / 7).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanProgress {
    pub target: u32,
    pub actual: u32,
    /// `actual / target × 100`; may exceed 100.
    pub percent: f64,
}

impl PlanProgress {
    /// Width of a progress bar, clamped to `0..=100`.
    #[must_use]
    pub fn bar_fill(&self) -> f64 {
        self.percent.clamp(0.0, 100.0)
    }

    #[must_use]
    pub fn is_over_target(&self) -> bool {
        self.percent > 100.0
    }
}

/// Count distinct workout days inside the window against the weekly target.
///
/// Several entries on one day count as one session. Entries whose date is not
/// a real calendar day are ignored.
#[must_use]
pub fn plan_progress(window: &PlanWindow, gym: &[GymLogEntry]) -> PlanProgress {
    let days: HashSet<NaiveDate> = gym
        .iter()
        .filter_map(|entry| parse_date(&entry.date))
        .filter(|date| window.contains(*date))
        .collect();
    let target = window.total_weeks().saturating_mul(window.sessions_per_week);
    let actual = u32::try_from(days.len()).unwrap_or(u32::MAX);
    let percent = if target > 0 {
        f64::from(actual) / f64::from(target) * 100.0
    } else {
        0.0
    };
    PlanProgress {
        target,
        actual,
        percent,
    }
}

// --- Gym log views ---

/// Best weight per exercise id across the whole log, floored at zero.
#[must_use]
pub fn top_weight_by_exercise(gym: &[GymLogEntry]) -> HashMap<String, f64> {
    let mut best: HashMap<String, f64> = HashMap::new();
    for entry in gym {
        let slot = best.entry(entry.exercise_id.clone()).or_insert(0.0);
        *slot = slot.max(entry.weight);
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseGroup {
    pub exercise_id: String,
    /// `None` when the exercise has been deleted from the reference list.
    pub exercise_name: Option<String>,
    pub tags: Vec<ExerciseTag>,
    pub entries: Vec<GymLogEntry>,
    pub best_weight: f64,
    pub total_sets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GymSession {
    pub date: String,
    pub exercises: Vec<ExerciseGroup>,
    pub exercise_count: usize,
    pub total_sets: f64,
}

/// Gym log grouped into one session per date (newest first), and within each
/// session one group per exercise ordered by name.
#[must_use]
pub fn gym_sessions(gym: &[GymLogEntry], exercises: &[Exercise]) -> Vec<GymSession> {
    let mut by_date: BTreeMap<&str, Vec<&GymLogEntry>> = BTreeMap::new();
    for entry in gym {
        by_date.entry(entry.date.as_str()).or_default().push(entry);
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, entries)| {
            let mut groups: Vec<ExerciseGroup> = Vec::new();
            for entry in entries {
                let pos = groups
                    .iter()
                    .position(|g| g.exercise_id == entry.exercise_id);
                let group = if let Some(pos) = pos {
                    &mut groups[pos]
                } else {
                    let exercise = exercises.resolve(&entry.exercise_id);
                    groups.push(ExerciseGroup {
                        exercise_id: entry.exercise_id.clone(),
                        exercise_name: exercise.map(|e| e.name.clone()),
                        tags: exercise
                            .map(|e| e.tags.iter().copied().collect())
                            .unwrap_or_default(),
                        entries: Vec::new(),
                        best_weight: 0.0,
                        total_sets: 0.0,
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                };
                group.best_weight = group.best_weight.max(entry.weight);
                group.total_sets += entry.sets;
                group.entries.push(entry.clone());
            }
            groups.sort_by_cached_key(|g| {
                g.exercise_name
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
            });
            let total_sets = groups.iter().map(|g| g.total_sets).sum();
            GymSession {
                date: date.to_string(),
                exercise_count: groups.len(),
                exercises: groups,
                total_sets,
            }
        })
        .collect()
}

// --- Nutrition log views ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionDay {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub entries: Vec<NutritionLogEntry>,
}

/// Nutrition log grouped per date, newest first, with daily totals.
#[must_use]
pub fn nutrition_days(nutrition: &[NutritionLogEntry]) -> Vec<NutritionDay> {
    let mut by_date: BTreeMap<&str, NutritionDay> = BTreeMap::new();
    for entry in nutrition {
        let day = by_date
            .entry(entry.date.as_str())
            .or_insert_with(|| NutritionDay {
                date: entry.date.clone(),
                calories: 0.0,
                protein: 0.0,
                entries: Vec::new(),
            });
        day.calories += entry.calories;
        day.protein += entry.protein;
        day.entries.push(entry.clone());
    }
    by_date.into_values().rev().collect()
}

// --- Day details ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GymLine {
    pub entry_id: String,
    pub exercise: String,
    pub sets: f64,
    pub reps: f64,
    pub weight: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodLine {
    pub entry_id: String,
    pub food: String,
    pub qty: f64,
    pub calories: f64,
    pub protein: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetails {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub body: Option<BodyLogEntry>,
    pub gym: Vec<GymLine>,
    pub food: Vec<FoodLine>,
}

/// Everything logged on `date` with foreign keys resolved to names.
/// `None` when nothing at all was logged that day.
#[must_use]
pub fn day_details(state: &AppState, date: &str) -> Option<DayDetails> {
    let index = index_by_date(&state.gym_log, &state.nutrition_log, &state.body_log);
    let day = index.get(date)?;
    let gym = day
        .gym_entries
        .iter()
        .map(|g| GymLine {
            entry_id: g.id.clone(),
            exercise: state.exercises.display_name(&g.exercise_id).to_string(),
            sets: g.sets,
            reps: g.reps,
            weight: g.weight,
            notes: g.notes.clone(),
        })
        .collect();
    let food = state
        .nutrition_log
        .iter()
        .filter(|n| n.date == date)
        .map(|n| FoodLine {
            entry_id: n.id.clone(),
            food: state.foods.display_name(&n.food_id).to_string(),
            qty: n.qty,
            calories: n.calories,
            protein: n.protein,
        })
        .collect();
    Some(DayDetails {
        date: day.date.clone(),
        calories: day.total_calories,
        protein: day.total_protein,
        body: day.body_entry.clone(),
        gym,
        food,
    })
}

// --- Overview ---

/// Progress toward a daily goal as a whole percent, capped at 100.
/// `None` when no goal is set.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn goal_percent(value: f64, goal: f64) -> Option<u32> {
    if goal == 0.0 {
        return None;
    }
    let pct = (value / goal * 100.0).round().clamp(0.0, 100.0);
    Some(pct as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub date: String,
    pub calories: f64,
    pub calories_goal_pct: Option<u32>,
    pub protein: f64,
    pub protein_goal_pct: Option<u32>,
    pub gym_volume: f64,
    pub latest_weight: Option<f64>,
    pub target_weight: f64,
    pub plan: PlanProgress,
}

/// Headline numbers for `today` plus plan progress.
#[must_use]
pub fn overview(state: &AppState, today: &str, window: &PlanWindow) -> Overview {
    let index = index_by_date(&state.gym_log, &state.nutrition_log, &state.body_log);
    let (calories, protein) = index
        .get(today)
        .map_or((0.0, 0.0), |d| (d.total_calories, d.total_protein));
    let gym_volume = gym_volume_by_date(&state.gym_log)
        .into_iter()
        .find(|p| p.date == today)
        .map_or(0.0, |p| p.volume);
    let latest_weight = body_trend(&state.body_log).last().map(|b| b.weight);
    Overview {
        date: today.to_string(),
        calories,
        calories_goal_pct: goal_percent(calories, state.goals.calories),
        protein,
        protein_goal_pct: goal_percent(protein, state.goals.protein),
        gym_volume,
        latest_weight,
        target_weight: state.goals.weight,
        plan: plan_progress(window, &state.gym_log),
    }
}

// --- Reference list filters ---

/// Exercises carrying `tag` (when given) whose name contains `query`, case-insensitively.
#[must_use]
pub fn filter_exercises<'a>(
    exercises: &'a [Exercise],
    tag: Option<ExerciseTag>,
    query: Option<&str>,
) -> Vec<&'a Exercise> {
    let needle = query.map(str::to_lowercase).unwrap_or_default();
    exercises
        .iter()
        .filter(|e| tag.is_none_or(|t| e.has_tag(t)))
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}

#[must_use]
pub fn filter_foods<'a>(foods: &'a [Food], query: Option<&str>) -> Vec<&'a Food> {
    let needle = query.map(str::to_lowercase).unwrap_or_default();
    foods
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .collect()
}

/// Resolved exercise name for display, falling back to the placeholder.
#[must_use]
pub fn exercise_label(group: &ExerciseGroup) -> &str {
    group.exercise_name.as_deref().unwrap_or(UNKNOWN_NAME)
}
