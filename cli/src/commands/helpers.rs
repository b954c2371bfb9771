use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::models::{DATE_FORMAT, Exercise, Food};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, DATE_FORMAT).with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Report the outcome of a delete. Exits with status 2 when nothing matched.
pub(crate) fn report_deleted(kind: &str, id: &str, removed: bool, json: bool) {
    if removed {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted {kind} {id}");
        }
    } else {
        if json {
            println!("{}", json_error(&format!("No {kind} with ID {id}")));
        } else {
            eprintln!("No {kind} with ID {id}");
        }
        process::exit(2);
    }
}

/// Whether an empty list should end the command with status 2. JSON output prints `[]` and succeeds.
pub(crate) fn empty_table(len: usize, json: bool) -> bool {
    len == 0 && !json
}

pub(crate) fn print_exercise_table(exercises: &[&Exercise]) {
    #[derive(Tabled)]
    struct ExerciseRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Tags")]
        tags: String,
    }

    let rows: Vec<ExerciseRow> = exercises
        .iter()
        .map(|e| ExerciseRow {
            id: e.id.clone(),
            name: truncate(&e.name, 35),
            tags: e
                .tags
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_food_table(foods: &[&Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Cal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            id: f.id.clone(),
            name: truncate(&f.name, 35),
            calories: format!("{:.0}", f.calories),
            protein: format!("{:.1}", f.protein),
            carbs: format!("{:.1}", f.carbs),
            fat: format!("{:.1}", f.fat),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Format a number with at most one decimal, dropping a trailing `.0`.
pub(crate) fn fmt_num(v: f64) -> String {
    let v = no_neg_zero((v * 10.0).round() / 10.0);
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2025-07-01".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
        assert!(parse_date(Some("2025-02-30".to_string())).is_err());
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(52.5), "52.5");
        assert_eq!(fmt_num(176.369_6), "176.4");
        assert_eq!(fmt_num(-0.0), "0");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("No gym entry"), r#"{"error":"No gym entry"}"#);
    }

    #[test]
    fn test_empty_table() {
        assert!(empty_table(0, false));
        assert!(!empty_table(0, true));
        assert!(!empty_table(3, false));
        assert!(!empty_table(3, true));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
