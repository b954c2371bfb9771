use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Textual form of every stored date. Lexical and chronological order coincide.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const LBS_PER_KG: f64 = 2.20462;
pub const CM_PER_INCH: f64 = 2.54;

// --- Exercise tags ---

/// Closed palette of muscle-group labels an exercise can carry.
///
/// Declaration order is palette order; sets of tags iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExerciseTag {
    Legs,
    Biceps,
    Triceps,
    Chest,
    Back,
    Shoulders,
    Core,
}

impl ExerciseTag {
    pub const ALL: [ExerciseTag; 7] = [
        ExerciseTag::Legs,
        ExerciseTag::Biceps,
        ExerciseTag::Triceps,
        ExerciseTag::Chest,
        ExerciseTag::Back,
        ExerciseTag::Shoulders,
        ExerciseTag::Core,
    ];

    /// Stored key, as it appears in persisted and backup JSON.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ExerciseTag::Legs => "legs",
            ExerciseTag::Biceps => "biceps",
            ExerciseTag::Triceps => "triceps",
            ExerciseTag::Chest => "chest",
            ExerciseTag::Back => "back",
            ExerciseTag::Shoulders => "shoulders",
            ExerciseTag::Core => "core",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExerciseTag::Legs => "Legs",
            ExerciseTag::Biceps => "Biceps",
            ExerciseTag::Triceps => "Triceps",
            ExerciseTag::Chest => "Chest",
            ExerciseTag::Back => "Back",
            ExerciseTag::Shoulders => "Shoulders",
            ExerciseTag::Core => "Core",
        }
    }

    /// Hex colour used when rendering the tag chip.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            ExerciseTag::Legs => "#9333ea",
            ExerciseTag::Biceps => "#14b8a6",
            ExerciseTag::Triceps => "#f97316",
            ExerciseTag::Chest => "#ef4444",
            ExerciseTag::Back => "#0ea5e9",
            ExerciseTag::Shoulders => "#f59e0b",
            ExerciseTag::Core => "#22c55e",
        }
    }
}

impl fmt::Display for ExerciseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExerciseTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        ExerciseTag::ALL
            .into_iter()
            .find(|t| t.key() == lower)
            .ok_or_else(|| {
                let keys: Vec<&str> = ExerciseTag::ALL.iter().map(|t| t.key()).collect();
                anyhow::anyhow!("Invalid tag '{s}'. Must be one of: {}", keys.join(", "))
            })
    }
}

impl Serialize for ExerciseTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for ExerciseTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// --- Lenient field decoding ---

/// Coerce any JSON value to a number the way a loosely typed form field would:
/// numbers pass through, numeric strings are parsed, booleans become 1/0, and
/// everything else (null, empty string, garbage, arrays, objects) becomes 0.
#[must_use]
pub fn lenient_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Coerce a JSON value to text. Strings pass through, numbers are printed,
/// null and structured values become empty.
#[must_use]
pub fn lenient_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_number(&value))
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_text(&value))
}

fn de_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeSet<ExerciseTag>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(BTreeSet::new());
    };
    let mut tags = BTreeSet::new();
    for item in &items {
        match item.as_str().map(str::parse::<ExerciseTag>) {
            Some(Ok(tag)) => {
                tags.insert(tag);
            }
            _ => tracing::warn!(tag = %item, "Dropping unknown exercise tag"),
        }
    }
    Ok(tags)
}

/// Generate a fresh record id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// --- Reference data ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: BTreeSet<ExerciseTag>,
}

impl Exercise {
    #[must_use]
    pub fn has_tag(&self, tag: ExerciseTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_tag(&mut self, tag: ExerciseTag) {
        if !self.tags.remove(&tag) {
            self.tags.insert(tag);
        }
    }
}

/// Nutrition values are per defined serving of the food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub fat: f64,
}

// --- Log entries ---

/// Weight is in kilograms regardless of the display unit preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymLogEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_text")]
    pub exercise_id: String,
    #[serde(default, deserialize_with = "de_number")]
    pub sets: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub reps: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub weight: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub notes: String,
}

impl GymLogEntry {
    /// Training volume: sets × reps × weight.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.sets * self.reps * self.weight
    }
}

/// `calories` and `protein` are fixed when the entry is logged and do not
/// follow later edits to the referenced food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionLogEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_text")]
    pub food_id: String,
    #[serde(default, deserialize_with = "de_number")]
    pub qty: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub notes: String,
}

/// Lengths in centimetres, weight in kilograms, `fat` and `muscle` in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyLogEntry {
    #[serde(default, deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub date: String,
    #[serde(default, deserialize_with = "de_number")]
    pub weight: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub height: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub muscle: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub fat: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub waist: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub arms: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub chest: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub notes: String,
}

// --- Settings ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    #[must_use]
    pub fn weight_label(self) -> &'static str {
        match self {
            UnitPreference::Metric => "kg",
            UnitPreference::Imperial => "lb",
        }
    }

    #[must_use]
    pub fn length_label(self) -> &'static str {
        match self {
            UnitPreference::Metric => "cm",
            UnitPreference::Imperial => "in",
        }
    }

    /// Convert a stored kilogram value for display.
    #[must_use]
    pub fn display_weight(self, kg: f64) -> f64 {
        match self {
            UnitPreference::Metric => kg,
            UnitPreference::Imperial => kg_to_lb(kg),
        }
    }

    /// Convert a stored centimetre value for display.
    #[must_use]
    pub fn display_length(self, cm: f64) -> f64 {
        match self {
            UnitPreference::Metric => cm,
            UnitPreference::Imperial => cm_to_in(cm),
        }
    }
}

impl fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitPreference::Metric => f.write_str("metric"),
            UnitPreference::Imperial => f.write_str("imperial"),
        }
    }
}

impl FromStr for UnitPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitPreference::Metric),
            "imperial" => Ok(UnitPreference::Imperial),
            _ => bail!("Invalid unit '{s}'. Must be 'metric' or 'imperial'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default, deserialize_with = "de_number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub weight: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: 2200.0,
            protein: 180.0,
            weight: 80.0,
        }
    }
}

#[must_use]
pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

#[must_use]
pub fn cm_to_in(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

// --- Application state ---

/// Everything the tracker knows: settings plus the five record collections.
///
/// Owned by `TrackerService` and lent to the aggregation functions as plain
/// slices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub unit: UnitPreference,
    pub goals: Goals,
    pub exercises: Vec<Exercise>,
    pub foods: Vec<Food>,
    pub gym_log: Vec<GymLogEntry>,
    pub nutrition_log: Vec<NutritionLogEntry>,
    pub body_log: Vec<BodyLogEntry>,
}

impl AppState {
    /// First-run state: default settings, a few starter exercises and foods,
    /// and empty logs.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            unit: UnitPreference::default(),
            goals: Goals::default(),
            exercises: seed_exercises(),
            foods: seed_foods(),
            gym_log: Vec::new(),
            nutrition_log: Vec::new(),
            body_log: Vec::new(),
        }
    }
}

#[must_use]
pub fn seed_exercises() -> Vec<Exercise> {
    [
        ("Bench Press", ExerciseTag::Chest),
        ("Squat", ExerciseTag::Legs),
        ("Lat Pulldown", ExerciseTag::Back),
    ]
    .into_iter()
    .map(|(name, tag)| Exercise {
        id: new_id(),
        name: name.to_string(),
        tags: BTreeSet::from([tag]),
    })
    .collect()
}

#[must_use]
pub fn seed_foods() -> Vec<Food> {
    vec![
        Food {
            id: new_id(),
            name: "Chicken breast 100g".to_string(),
            calories: 165.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
        },
        Food {
            id: new_id(),
            name: "Egg 1x".to_string(),
            calories: 78.0,
            protein: 6.0,
            carbs: 0.6,
            fat: 5.0,
        },
    ]
}

// --- Inputs for new records ---

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone)]
pub struct NewGymEntry {
    pub date: NaiveDate,
    pub exercise_id: String,
    pub sets: f64,
    pub reps: f64,
    pub weight: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNutritionEntry {
    pub date: NaiveDate,
    pub food_id: String,
    pub qty: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBodyEntry {
    pub date: NaiveDate,
    pub weight: f64,
    pub height: f64,
    pub muscle: f64,
    pub fat: f64,
    pub waist: f64,
    pub arms: f64,
    pub chest: f64,
    pub notes: Option<String>,
}

pub fn validate_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("{kind} name must not be empty");
    }
    Ok(trimmed.to_string())
}

fn check_amount(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        bail!("{label} must be a finite number");
    }
    if value < 0.0 {
        bail!("{label} must not be negative");
    }
    Ok(())
}

pub fn validate_food(food: &NewFood) -> Result<()> {
    validate_name("Food", &food.name)?;
    for (label, value) in [
        ("calories", food.calories),
        ("protein", food.protein),
        ("carbs", food.carbs),
        ("fat", food.fat),
    ] {
        check_amount(label, value)?;
    }
    Ok(())
}

pub fn validate_gym_entry(entry: &NewGymEntry) -> Result<()> {
    for (label, value) in [
        ("sets", entry.sets),
        ("reps", entry.reps),
        ("weight", entry.weight),
    ] {
        check_amount(label, value)?;
    }
    Ok(())
}

pub fn validate_body_entry(entry: &NewBodyEntry) -> Result<()> {
    for (label, value) in [
        ("weight", entry.weight),
        ("height", entry.height),
        ("muscle", entry.muscle),
        ("fat", entry.fat),
        ("waist", entry.waist),
        ("arms", entry.arms),
        ("chest", entry.chest),
    ] {
        check_amount(label, value)?;
    }
    if entry.fat > 100.0 || entry.muscle > 100.0 {
        bail!("fat and muscle are percentages and must not exceed 100");
    }
    Ok(())
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date. `None` for anything that is not a real calendar day.
#[must_use]
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_keys_round_trip() {
        for tag in ExerciseTag::ALL {
            assert_eq!(tag.key().parse::<ExerciseTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_tag_parse_case_insensitive() {
        assert_eq!("Chest".parse::<ExerciseTag>().unwrap(), ExerciseTag::Chest);
        assert_eq!(" LEGS ".parse::<ExerciseTag>().unwrap(), ExerciseTag::Legs);
        assert!("glutes".parse::<ExerciseTag>().is_err());
    }

    #[test]
    fn test_tag_palette() {
        assert_eq!(ExerciseTag::Shoulders.label(), "Shoulders");
        assert_eq!(ExerciseTag::Chest.color(), "#ef4444");
        assert_eq!(ExerciseTag::Core.to_string(), "Core");
    }

    #[test]
    fn test_toggle_tag() {
        let mut ex = Exercise {
            id: "e1".to_string(),
            name: "Curl".to_string(),
            tags: BTreeSet::new(),
        };
        ex.toggle_tag(ExerciseTag::Biceps);
        assert!(ex.has_tag(ExerciseTag::Biceps));
        ex.toggle_tag(ExerciseTag::Biceps);
        assert!(!ex.has_tag(ExerciseTag::Biceps));
    }

    #[test]
    fn test_exercise_missing_tags_is_empty() {
        let ex: Exercise = serde_json::from_value(json!({"id": "e1", "name": "Squat"})).unwrap();
        assert!(ex.tags.is_empty());
    }

    #[test]
    fn test_exercise_unknown_tags_dropped() {
        let ex: Exercise = serde_json::from_value(json!({
            "id": "e1",
            "name": "Squat",
            "tags": ["legs", "glutes", 7, "core"]
        }))
        .unwrap();
        assert_eq!(
            ex.tags.into_iter().collect::<Vec<_>>(),
            vec![ExerciseTag::Legs, ExerciseTag::Core]
        );
    }

    #[test]
    fn test_exercise_serializes_tags_in_palette_order() {
        let ex = Exercise {
            id: "e1".to_string(),
            name: "Row".to_string(),
            tags: BTreeSet::from([ExerciseTag::Back, ExerciseTag::Biceps]),
        };
        let v = serde_json::to_value(&ex).unwrap();
        assert_eq!(v["tags"], json!(["biceps", "back"]));
    }

    #[test]
    fn test_lenient_number() {
        assert!((lenient_number(&json!(12.5)) - 12.5).abs() < f64::EPSILON);
        assert!((lenient_number(&json!(" 40 ")) - 40.0).abs() < f64::EPSILON);
        assert!((lenient_number(&json!(true)) - 1.0).abs() < f64::EPSILON);
        assert!(lenient_number(&json!("")).abs() < f64::EPSILON);
        assert!(lenient_number(&json!("abc")).abs() < f64::EPSILON);
        assert!(lenient_number(&json!(null)).abs() < f64::EPSILON);
        assert!(lenient_number(&json!([1, 2])).abs() < f64::EPSILON);
        assert!(lenient_number(&json!("NaN")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gym_entry_lenient_fields() {
        let entry: GymLogEntry = serde_json::from_value(json!({
            "id": "g1",
            "date": "2025-07-01",
            "exerciseId": "e1",
            "sets": "3",
            "reps": null,
            "notes": null
        }))
        .unwrap();
        assert!((entry.sets - 3.0).abs() < f64::EPSILON);
        assert!(entry.reps.abs() < f64::EPSILON);
        assert!(entry.weight.abs() < f64::EPSILON);
        assert_eq!(entry.notes, "");
        assert!(entry.volume().abs() < f64::EPSILON);
    }

    #[test]
    fn test_gym_entry_camel_case_layout() {
        let entry = GymLogEntry {
            id: "g1".to_string(),
            date: "2025-07-01".to_string(),
            exercise_id: "e1".to_string(),
            sets: 3.0,
            reps: 10.0,
            weight: 50.0,
            notes: String::new(),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["exerciseId"], "e1");
        assert!((entry.volume() - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_preference_serde() {
        assert_eq!(
            serde_json::to_string(&UnitPreference::Imperial).unwrap(),
            "\"imperial\""
        );
        let u: UnitPreference = serde_json::from_str("\"metric\"").unwrap();
        assert_eq!(u, UnitPreference::Metric);
        assert!("stones".parse::<UnitPreference>().is_err());
    }

    #[test]
    fn test_unit_conversions() {
        assert!((kg_to_lb(100.0) - 220.462).abs() < 1e-9);
        assert!((cm_to_in(254.0) - 100.0).abs() < 1e-9);
        assert!((UnitPreference::Imperial.display_weight(1.0) - LBS_PER_KG).abs() < 1e-9);
        assert!((UnitPreference::Metric.display_length(180.0) - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_goals_default_and_lenient() {
        let goals = Goals::default();
        assert!((goals.calories - 2200.0).abs() < f64::EPSILON);
        let parsed: Goals = serde_json::from_value(json!({"calories": "2500"})).unwrap();
        assert!((parsed.calories - 2500.0).abs() < f64::EPSILON);
        assert!(parsed.protein.abs() < f64::EPSILON);
    }

    #[test]
    fn test_seeded_state() {
        let state = AppState::seeded();
        assert_eq!(state.exercises.len(), 3);
        assert_eq!(state.foods.len(), 2);
        assert!(state.gym_log.is_empty());
        assert_eq!(state.unit, UnitPreference::Metric);
        let ids: BTreeSet<&str> = state.exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Food", "  Oats ").unwrap(), "Oats");
        assert!(validate_name("Food", "   ").is_err());
    }

    #[test]
    fn test_validate_food_negative() {
        let food = NewFood {
            name: "Bad".to_string(),
            calories: -1.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        };
        assert!(validate_food(&food).is_err());
    }

    #[test]
    fn test_validate_body_entry_percentages() {
        let entry = NewBodyEntry {
            fat: 120.0,
            ..NewBodyEntry::default()
        };
        assert!(validate_body_entry(&entry).is_err());
        assert!(validate_body_entry(&NewBodyEntry::default()).is_ok());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-07-01"),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }
}
