use std::path::Path;
use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::lookup::Lookup;
use fitlog_core::models::NewNutritionEntry;
use fitlog_core::service::TrackerService;

use super::export_csv;
use super::helpers::{fmt_num, parse_date, report_deleted, truncate};

pub(crate) fn cmd_nutrition_log(
    svc: &mut TrackerService,
    food_id: &str,
    qty: Option<f64>,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.log_food(&NewNutritionEntry {
        date,
        food_id: food_id.to_string(),
        qty,
        notes,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = svc.state().foods.display_name(&entry.food_id);
        println!(
            "Logged {} x {name} for {}: {} kcal, {} g protein (ID: {})",
            fmt_num(entry.qty),
            entry.date,
            fmt_num(entry.calories),
            fmt_num(entry.protein),
            entry.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_nutrition_list(svc: &TrackerService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Qty")]
        qty: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let days = svc.nutrition_days();

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    if days.is_empty() {
        eprintln!("No food logged");
        process::exit(2);
    }

    let foods = &svc.state().foods;
    for day in &days {
        println!(
            "=== {} === {} kcal, {} g protein",
            day.date,
            fmt_num(day.calories),
            fmt_num(day.protein)
        );
        let rows: Vec<EntryRow> = day
            .entries
            .iter()
            .map(|e| EntryRow {
                id: e.id.clone(),
                food: truncate(foods.display_name(&e.food_id), 35),
                qty: fmt_num(e.qty),
                calories: fmt_num(e.calories),
                protein: format!("{}g", fmt_num(e.protein)),
                notes: truncate(&e.notes, 30),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
            .to_string();
        println!("{table}\n");
    }

    Ok(())
}

pub(crate) fn cmd_nutrition_delete(svc: &mut TrackerService, id: &str, json: bool) -> Result<()> {
    let removed = svc.delete_nutrition_entry(id);
    report_deleted("nutrition entry", id, removed, json);
    Ok(())
}

pub(crate) fn cmd_nutrition_export(svc: &TrackerService, path: &Path, json: bool) -> Result<()> {
    export_csv(path, json, |out| svc.export_nutrition_csv(out))
}
