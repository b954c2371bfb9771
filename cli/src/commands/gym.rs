use std::path::Path;
use std::process;

use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::aggregate::exercise_label;
use fitlog_core::lookup::Lookup;
use fitlog_core::models::NewGymEntry;
use fitlog_core::service::TrackerService;

use super::export_csv;
use super::helpers::{fmt_num, parse_date, report_deleted, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_gym_log(
    svc: &mut TrackerService,
    exercise_id: &str,
    sets: f64,
    reps: f64,
    weight: f64,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.log_workout(&NewGymEntry {
        date,
        exercise_id: exercise_id.to_string(),
        sets,
        reps,
        weight,
        notes,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = svc.state().exercises.display_name(&entry.exercise_id);
        let top = svc.top_weights().get(&entry.exercise_id).copied().unwrap_or(0.0);
        println!(
            "Logged {name}: {} x {} @ {} kg for {} (ID: {})",
            fmt_num(entry.sets),
            fmt_num(entry.reps),
            fmt_num(entry.weight),
            entry.date,
            entry.id
        );
        println!("  Best so far: {} kg", fmt_num(top));
    }

    Ok(())
}

pub(crate) fn cmd_gym_list(svc: &TrackerService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct SetRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Sets")]
        sets: String,
        #[tabled(rename = "Reps")]
        reps: String,
        #[tabled(rename = "Weight (kg)")]
        weight: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let sessions = svc.gym_sessions();

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        eprintln!("No workouts logged");
        process::exit(2);
    }

    for session in &sessions {
        println!(
            "=== {} === {} exercises, {} sets\n",
            session.date,
            session.exercise_count,
            fmt_num(session.total_sets)
        );
        for group in &session.exercises {
            let tags = group
                .tags
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(", ");
            let tags = if tags.is_empty() { String::new() } else { format!(" [{tags}]") };
            println!(
                "  {}{tags}: best {} kg, {} sets",
                exercise_label(group),
                fmt_num(group.best_weight),
                fmt_num(group.total_sets)
            );
            let rows: Vec<SetRow> = group
                .entries
                .iter()
                .map(|e| SetRow {
                    id: e.id.clone(),
                    sets: fmt_num(e.sets),
                    reps: fmt_num(e.reps),
                    weight: fmt_num(e.weight),
                    notes: truncate(&e.notes, 40),
                })
                .collect();
            let table = Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
                .to_string();
            println!("{table}\n");
        }
    }

    Ok(())
}

pub(crate) fn cmd_gym_delete(svc: &mut TrackerService, id: &str, json: bool) -> Result<()> {
    let removed = svc.delete_gym_entry(id);
    report_deleted("gym entry", id, removed, json);
    Ok(())
}

pub(crate) fn cmd_gym_export(svc: &TrackerService, path: &Path, json: bool) -> Result<()> {
    export_csv(path, json, |out| svc.export_gym_csv(out))
}
