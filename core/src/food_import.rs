use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::models::{Food, lenient_number, lenient_text, new_id};

/// A single food parsed from an import file, before deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodRow {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// What a food import would do / did.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FoodImportSummary {
    pub rows_parsed: usize,
    pub added: usize,
    pub skipped_duplicates: usize,
    pub skipped_invalid: usize,
}

fn field<'a>(item: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| item.get(*alias).filter(|v| !v.is_null()))
}

fn number(item: &Map<String, Value>, aliases: &[&str]) -> f64 {
    field(item, aliases).map_or(0.0, lenient_number)
}

/// Parse a food import file from any reader.
///
/// Accepted shapes: a bare array of items, or an object holding the array
/// under `foods` or `foodDB` (first present wins). Items that are not objects
/// yield `None` so the caller can count them.
pub fn parse_food_file<R: Read>(reader: R) -> Result<Vec<Option<FoodRow>>> {
    let value: Value = serde_json::from_reader(reader).context("Food file is not valid JSON")?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match field(map, &["foods", "foodDB"]) {
            Some(Value::Array(items)) => items,
            Some(_) => bail!("Food list must be an array"),
            None => bail!("Food file has no 'foods' or 'foodDB' list"),
        },
        _ => bail!("Food file must be an array or an object with a food list"),
    };

    Ok(items
        .iter()
        .map(|item| {
            let item = item.as_object()?;
            Some(FoodRow {
                name: field(item, &["name", "food"])
                    .map(lenient_text)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                calories: number(item, &["calories", "kcal"]),
                protein: number(item, &["protein", "proteins"]),
                carbs: number(item, &["carbs", "carbohydrates"]),
                fat: number(item, &["fat", "fats"]),
            })
        })
        .collect())
}

/// Append parsed foods to `foods`, skipping names already present.
///
/// Names are compared trimmed and case-insensitively against the existing
/// list and against foods added earlier in the same import. When `dry_run` is
/// true, `foods` is left untouched.
pub fn import_foods(
    foods: &mut Vec<Food>,
    rows: &[Option<FoodRow>],
    dry_run: bool,
) -> FoodImportSummary {
    let mut summary = FoodImportSummary {
        rows_parsed: rows.len(),
        ..FoodImportSummary::default()
    };
    let mut seen: HashSet<String> = foods
        .iter()
        .map(|f| f.name.trim().to_lowercase())
        .collect();
    let mut added = Vec::new();

    for row in rows {
        let Some(row) = row.as_ref().filter(|r| !r.name.is_empty()) else {
            summary.skipped_invalid += 1;
            continue;
        };
        if !seen.insert(row.name.to_lowercase()) {
            summary.skipped_duplicates += 1;
            continue;
        }
        added.push(Food {
            id: new_id(),
            name: row.name.clone(),
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fat: row.fat,
        });
    }

    summary.added = added.len();
    if !dry_run {
        foods.extend(added);
    }
    summary
}
