use std::io::{Read, Write};

use anyhow::{Context, Result};

use crate::lookup::Lookup;
use crate::models::{BodyLogEntry, Exercise, Food, GymLogEntry, NutritionLogEntry};

pub const GYM_HEADERS: [&str; 6] = ["date", "exercise", "sets", "reps", "weight", "notes"];
pub const NUTRITION_HEADERS: [&str; 6] = ["date", "food", "qty", "calories", "protein", "notes"];
pub const BODY_HEADERS: [&str; 9] = [
    "date", "weight", "height", "fat", "muscle", "waist", "arms", "chest", "notes",
];

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Write the gym log as CSV, exercise ids resolved to names. Returns the row count.
pub fn write_gym_csv<W: Write>(out: W, gym: &[GymLogEntry], exercises: &[Exercise]) -> Result<usize> {
    let mut wtr = writer(out);
    wtr.write_record(GYM_HEADERS)?;
    for entry in gym {
        wtr.write_record([
            entry.date.clone(),
            exercises.display_name(&entry.exercise_id).to_string(),
            entry.sets.to_string(),
            entry.reps.to_string(),
            entry.weight.to_string(),
            entry.notes.clone(),
        ])
        .with_context(|| format!("Failed to write gym entry {}", entry.id))?;
    }
    wtr.flush()?;
    Ok(gym.len())
}

pub fn write_nutrition_csv<W: Write>(
    out: W,
    nutrition: &[NutritionLogEntry],
    foods: &[Food],
) -> Result<usize> {
    let mut wtr = writer(out);
    wtr.write_record(NUTRITION_HEADERS)?;
    for entry in nutrition {
        wtr.write_record([
            entry.date.clone(),
            foods.display_name(&entry.food_id).to_string(),
            entry.qty.to_string(),
            entry.calories.to_string(),
            entry.protein.to_string(),
            entry.notes.clone(),
        ])
        .with_context(|| format!("Failed to write nutrition entry {}", entry.id))?;
    }
    wtr.flush()?;
    Ok(nutrition.len())
}

/// Body values are written as stored (metric).
pub fn write_body_csv<W: Write>(out: W, body: &[BodyLogEntry]) -> Result<usize> {
    let mut wtr = writer(out);
    wtr.write_record(BODY_HEADERS)?;
    for entry in body {
        wtr.write_record([
            entry.date.clone(),
            entry.weight.to_string(),
            entry.height.to_string(),
            entry.fat.to_string(),
            entry.muscle.to_string(),
            entry.waist.to_string(),
            entry.arms.to_string(),
            entry.chest.to_string(),
            entry.notes.clone(),
        ])
        .with_context(|| format!("Failed to write body entry {}", entry.id))?;
    }
    wtr.flush()?;
    Ok(body.len())
}

/// Read CSV data rows (header skipped) as plain strings.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn gym_entry(notes: &str) -> GymLogEntry {
        GymLogEntry {
            id: "g1".to_string(),
            date: "2025-07-01".to_string(),
            exercise_id: "e1".to_string(),
            sets: 3.0,
            reps: 10.0,
            weight: 52.5,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_quoting_and_round_trip() {
        let exercises = vec![Exercise {
            id: "e1".to_string(),
            name: "Bench Press".to_string(),
            tags: BTreeSet::new(),
        }];
        let mut out = Vec::new();
        write_gym_csv(&mut out, &[gym_entry("He said \"hi\", ok")], &exercises).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "date,exercise,sets,reps,weight,notes\n\
             2025-07-01,Bench Press,3,10,52.5,\"He said \"\"hi\"\", ok\"\n"
        );

        let rows = read_csv_rows(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][5], "He said \"hi\", ok");
    }

    #[test]
    fn test_newline_field_round_trip() {
        let mut out = Vec::new();
        write_gym_csv(&mut out, &[gym_entry("line one\nline two")], &[]).unwrap();
        let rows = read_csv_rows(out.as_slice()).unwrap();
        assert_eq!(rows[0][1], "-");
        assert_eq!(rows[0][5], "line one\nline two");
    }

    #[test]
    fn test_nutrition_csv() {
        let foods = vec![Food {
            id: "f1".to_string(),
            name: "Egg 1x".to_string(),
            calories: 78.0,
            protein: 6.0,
            carbs: 0.6,
            fat: 5.0,
        }];
        let entry = NutritionLogEntry {
            id: "n1".to_string(),
            date: "2025-07-01".to_string(),
            food_id: "f1".to_string(),
            qty: 2.0,
            calories: 156.0,
            protein: 12.0,
            notes: String::new(),
        };
        let mut out = Vec::new();
        let count = write_nutrition_csv(&mut out, &[entry], &foods).unwrap();
        assert_eq!(count, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("date,food,qty,calories,protein,notes\n"));
        assert!(text.contains("2025-07-01,Egg 1x,2,156,12,"));
    }

    #[test]
    fn test_body_csv_header_only_when_empty() {
        let mut out = Vec::new();
        write_body_csv(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,weight,height,fat,muscle,waist,arms,chest,notes\n"
        );
    }
}
