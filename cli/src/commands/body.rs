use std::path::Path;
use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::models::NewBodyEntry;
use fitlog_core::service::TrackerService;

use super::export_csv;
use super::helpers::{fmt_num, parse_date, report_deleted, truncate};

/// Body measurements as entered on the command line, all metric.
pub(crate) struct BodyArgs {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub muscle: Option<f64>,
    pub fat: Option<f64>,
    pub waist: Option<f64>,
    pub arms: Option<f64>,
    pub chest: Option<f64>,
}

pub(crate) fn cmd_body_log(
    svc: &mut TrackerService,
    args: &BodyArgs,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.log_body(&NewBodyEntry {
        date,
        weight: args.weight.unwrap_or(0.0),
        height: args.height.unwrap_or(0.0),
        muscle: args.muscle.unwrap_or(0.0),
        fat: args.fat.unwrap_or(0.0),
        waist: args.waist.unwrap_or(0.0),
        arms: args.arms.unwrap_or(0.0),
        chest: args.chest.unwrap_or(0.0),
        notes,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let unit = svc.state().unit;
        println!(
            "Logged body measurement for {}: {} {} (ID: {})",
            entry.date,
            fmt_num(unit.display_weight(entry.weight)),
            unit.weight_label(),
            entry.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_body_list(svc: &TrackerService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct BodyRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Height")]
        height: String,
        #[tabled(rename = "Fat %")]
        fat: String,
        #[tabled(rename = "Muscle %")]
        muscle: String,
        #[tabled(rename = "Waist")]
        waist: String,
        #[tabled(rename = "Arms")]
        arms: String,
        #[tabled(rename = "Chest")]
        chest: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let trend = svc.body_trend();

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    if trend.is_empty() {
        eprintln!("No body measurements. Use `fitlog body log` to record one.");
        process::exit(2);
    }

    let unit = svc.state().unit;
    let length = |cm: f64| format!("{} {}", fmt_num(unit.display_length(cm)), unit.length_label());
    let rows: Vec<BodyRow> = trend
        .iter()
        .map(|e| BodyRow {
            id: e.id.clone(),
            date: e.date.clone(),
            weight: format!(
                "{} {}",
                fmt_num(unit.display_weight(e.weight)),
                unit.weight_label()
            ),
            height: length(e.height),
            fat: fmt_num(e.fat),
            muscle: fmt_num(e.muscle),
            waist: length(e.waist),
            arms: length(e.arms),
            chest: length(e.chest),
            notes: truncate(&e.notes, 30),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..9)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_body_delete(svc: &mut TrackerService, id: &str, json: bool) -> Result<()> {
    let removed = svc.delete_body_entry(id);
    report_deleted("body entry", id, removed, json);
    Ok(())
}

pub(crate) fn cmd_body_export(svc: &TrackerService, path: &Path, json: bool) -> Result<()> {
    export_csv(path, json, |out| svc.export_body_csv(out))
}
