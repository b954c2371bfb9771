use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeSet;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::aggregate::{self, PlanProgress, PlanWindow};
use fitlog_core::models::format_date;
use fitlog_core::service::TrackerService;

use super::helpers::{fmt_num, json_error, parse_date};

const BAR_WIDTH: usize = 30;

fn progress_bar(fill_pct: f64) -> String {
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((fill_pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn goal_line(label: &str, value: f64, goal: f64, pct: Option<u32>, unit: &str) -> String {
    match pct {
        Some(pct) => format!(
            "  {label:<9} {} / {} {unit} {} {pct}%",
            fmt_num(value),
            fmt_num(goal),
            progress_bar(f64::from(pct))
        ),
        None => format!("  {label:<9} {} {unit} (no goal set)", fmt_num(value)),
    }
}

fn print_plan(window: &PlanWindow, progress: &PlanProgress) {
    println!(
        "  Plan {} to {}, {} sessions/week",
        format_date(window.start),
        format_date(window.end),
        window.sessions_per_week
    );
    let over = if progress.is_over_target() {
        " (over target)"
    } else {
        ""
    };
    println!(
        "  Sessions {} / {} {} {:.1}%{over}",
        progress.actual,
        progress.target,
        progress_bar(progress.bar_fill()),
        progress.percent
    );
}

pub(crate) fn cmd_overview(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = format_date(parse_date(date)?);
    let view = svc.overview(&date);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let goals = &svc.state().goals;
    let unit = svc.state().unit;
    println!("=== {} ===\n", view.date);
    println!(
        "{}",
        goal_line("Calories", view.calories, goals.calories, view.calories_goal_pct, "kcal")
    );
    println!(
        "{}",
        goal_line("Protein", view.protein, goals.protein, view.protein_goal_pct, "g")
    );
    println!("  Volume    {} kg", fmt_num(view.gym_volume));
    match view.latest_weight {
        Some(w) => println!(
            "  Weight    {} {} (target {} {})",
            fmt_num(unit.display_weight(w)),
            unit.weight_label(),
            fmt_num(unit.display_weight(view.target_weight)),
            unit.weight_label()
        ),
        None => println!(
            "  Weight    - (target {} {})",
            fmt_num(unit.display_weight(view.target_weight)),
            unit.weight_label()
        ),
    }
    println!();
    print_plan(svc.plan(), &view.plan);

    Ok(())
}

pub(crate) fn cmd_plan(
    svc: &TrackerService,
    start: Option<String>,
    end: Option<String>,
    per_week: Option<u32>,
    json: bool,
) -> Result<()> {
    let base = svc.plan();
    let window = PlanWindow {
        start: start.map_or(Ok(base.start), |s| parse_date(Some(s)))?,
        end: end.map_or(Ok(base.end), |s| parse_date(Some(s)))?,
        sessions_per_week: per_week.unwrap_or(base.sessions_per_week),
    };
    let progress = aggregate::plan_progress(&window, &svc.state().gym_log);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "window": window,
                "progress": progress,
                "bar_fill": progress.bar_fill(),
                "over_target": progress.is_over_target(),
            })
        );
    } else {
        print_plan(&window, &progress);
    }

    Ok(())
}

pub(crate) fn cmd_day(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = format_date(parse_date(date)?);
    let Some(details) = svc.day_details(&date) else {
        if json {
            println!("{}", json_error(&format!("No entries for {date}")));
        } else {
            eprintln!("No entries for {date}");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("=== {} ===\n", details.date);
    println!(
        "  Nutrition: {} kcal, {} g protein",
        fmt_num(details.calories),
        fmt_num(details.protein)
    );
    for line in &details.food {
        println!(
            "    [{}] {} x {}: {} kcal, {} g protein",
            line.entry_id,
            fmt_num(line.qty),
            line.food,
            fmt_num(line.calories),
            fmt_num(line.protein)
        );
    }

    if let Some(body) = &details.body {
        let unit = svc.state().unit;
        println!(
            "  Body: {} {}, fat {}%, muscle {}%",
            fmt_num(unit.display_weight(body.weight)),
            unit.weight_label(),
            fmt_num(body.fat),
            fmt_num(body.muscle)
        );
    }

    if !details.gym.is_empty() {
        println!("  Workout:");
        for line in &details.gym {
            println!(
                "    [{}] {}: {} x {} @ {} kg",
                line.entry_id,
                line.exercise,
                fmt_num(line.sets),
                fmt_num(line.reps),
                fmt_num(line.weight)
            );
        }
    }

    Ok(())
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarView {
    Year(i32),
    Month(i32, u32),
}

/// A bare `--year` shows the whole year; otherwise one month, defaulting to today's.
fn calendar_view(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> CalendarView {
    match (year, month) {
        (Some(year), None) => CalendarView::Year(year),
        (year, month) => CalendarView::Month(
            year.unwrap_or_else(|| today.year()),
            month.unwrap_or_else(|| today.month()),
        ),
    }
}

fn join_days(days: &BTreeSet<u32>) -> String {
    days.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn cmd_calendar(
    svc: &TrackerService,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> Result<()> {
    match calendar_view(year, month, Local::now().date_naive()) {
        CalendarView::Year(year) => print_year(svc, year, json),
        CalendarView::Month(year, month) => print_month(svc, year, month, json),
    }
}

fn print_year(svc: &TrackerService, year: i32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Logged")]
        logged: usize,
        #[tabled(rename = "Days")]
        days: String,
    }

    let months = svc.active_days_in_year(year);

    if json {
        let months: Vec<_> = months
            .iter()
            .map(|(month, days)| serde_json::json!({ "month": month, "active_days": days }))
            .collect();
        println!("{}", serde_json::json!({ "year": year, "months": months }));
        return Ok(());
    }

    let rows: Vec<MonthRow> = months
        .iter()
        .zip(MONTH_NAMES)
        .map(|((_, days), name)| MonthRow {
            month: name.to_string(),
            logged: days.len(),
            days: join_days(days),
        })
        .collect();

    let total: usize = months.values().map(BTreeSet::len).sum();
    println!("{year}  ({total} days logged)");
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

fn print_month(svc: &TrackerService, year: i32, month: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct WeekRow {
        #[tabled(rename = "Sun")]
        sun: String,
        #[tabled(rename = "Mon")]
        mon: String,
        #[tabled(rename = "Tue")]
        tue: String,
        #[tabled(rename = "Wed")]
        wed: String,
        #[tabled(rename = "Thu")]
        thu: String,
        #[tabled(rename = "Fri")]
        fri: String,
        #[tabled(rename = "Sat")]
        sat: String,
    }

    let weeks = svc.month_matrix(year, month)?;
    let active = svc.active_days(year, month)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "year": year,
                "month": month,
                "weeks": weeks,
                "active_days": active,
            })
        );
        return Ok(());
    }

    let cell = |day: Option<NaiveDate>| -> String {
        day.map(|d| {
            let marker = if active.contains(&d.day()) { "*" } else { "" };
            format!("{}{marker}", d.day())
        })
        .unwrap_or_default()
    };

    let rows: Vec<WeekRow> = weeks
        .iter()
        .map(|w| WeekRow {
            sun: cell(w[0]),
            mon: cell(w[1]),
            tue: cell(w[2]),
            wed: cell(w[3]),
            thu: cell(w[4]),
            fri: cell(w[5]),
            sat: cell(w[6]),
        })
        .collect();

    println!("{year}-{month:02}  (* = logged)");
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
