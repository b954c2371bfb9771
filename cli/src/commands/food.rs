use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use fitlog_core::models::NewFood;
use fitlog_core::service::TrackerService;

use super::helpers::{empty_table, print_food_table, report_deleted};

pub(crate) fn cmd_food_add(
    svc: &mut TrackerService,
    name: &str,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    json: bool,
) -> Result<()> {
    let food = svc.add_food(&NewFood {
        name: name.to_string(),
        calories: calories.unwrap_or(0.0),
        protein: protein.unwrap_or(0.0),
        carbs: carbs.unwrap_or(0.0),
        fat: fat.unwrap_or(0.0),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let id = &food.id;
        println!("Added food: {name} (ID: {id})");
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &TrackerService, search: Option<&str>, json: bool) -> Result<()> {
    let foods = svc.list_foods(search);

    if empty_table(foods.len(), json) {
        eprintln!("No foods found");
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
    }

    Ok(())
}

pub(crate) fn cmd_food_remove(svc: &mut TrackerService, id: &str, json: bool) -> Result<()> {
    let removed = svc.remove_food(id);
    report_deleted("food", id, removed, json);
    Ok(())
}

pub(crate) fn cmd_food_import(
    svc: &mut TrackerService,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let summary = svc
        .import_foods(std::io::BufReader::new(file), dry_run)
        .with_context(|| format!("Could not import {}", path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "added": summary.added,
                "skipped_duplicates": summary.skipped_duplicates,
                "skipped_invalid": summary.skipped_invalid,
            })
        );
    } else if dry_run {
        println!("Dry run, no changes made.\n");
        println!("  Rows parsed:        {}", summary.rows_parsed);
        println!("  Foods to add:       {}", summary.added);
        println!("  Duplicates skipped: {}", summary.skipped_duplicates);
        println!("  Invalid skipped:    {}", summary.skipped_invalid);
    } else {
        println!("Imported {} foods.\n", summary.added);
        println!("  Rows parsed:        {}", summary.rows_parsed);
        println!("  Duplicates skipped: {}", summary.skipped_duplicates);
        println!("  Invalid skipped:    {}", summary.skipped_invalid);
    }

    Ok(())
}
