use anyhow::Result;
use clap::ValueEnum;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::service::TrackerService;

use super::helpers::fmt_num;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ChartKind {
    /// Total training volume per day
    GymVolume,
    /// Heaviest weight lifted per day
    GymMax,
    /// Calories and protein per day
    Nutrition,
    /// Body measurements over time
    Body,
    /// Volume, calories, and weight on one date axis
    Insights,
}

fn print_table<T: Tabled>(rows: &[T], numeric_from: usize) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(numeric_from..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

fn empty_exit() -> ! {
    eprintln!("No data to chart");
    process::exit(2);
}

pub(crate) fn cmd_chart(svc: &TrackerService, kind: ChartKind, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct VolumeRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Volume (kg)")]
        volume: String,
    }

    #[derive(Tabled)]
    struct MaxRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Max weight (kg)")]
        max_weight: String,
    }

    #[derive(Tabled)]
    struct NutritionRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
    }

    #[derive(Tabled)]
    struct BodyRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Fat %")]
        fat: String,
        #[tabled(rename = "Muscle %")]
        muscle: String,
    }

    #[derive(Tabled)]
    struct InsightRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Volume (kg)")]
        volume: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    match kind {
        ChartKind::GymVolume => {
            let series = svc.gym_volume_series();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                if series.is_empty() {
                    empty_exit();
                }
                let rows: Vec<VolumeRow> = series
                    .iter()
                    .map(|p| VolumeRow {
                        date: p.date.clone(),
                        volume: fmt_num(p.volume),
                    })
                    .collect();
                print_table(&rows, 1);
            }
        }
        ChartKind::GymMax => {
            let series = svc.gym_max_weight_series();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                if series.is_empty() {
                    empty_exit();
                }
                let rows: Vec<MaxRow> = series
                    .iter()
                    .map(|p| MaxRow {
                        date: p.date.clone(),
                        max_weight: fmt_num(p.max_weight),
                    })
                    .collect();
                print_table(&rows, 1);
            }
        }
        ChartKind::Nutrition => {
            let series = svc.nutrition_series();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                if series.is_empty() {
                    empty_exit();
                }
                let rows: Vec<NutritionRow> = series
                    .iter()
                    .map(|p| NutritionRow {
                        date: p.date.clone(),
                        calories: fmt_num(p.calories),
                        protein: format!("{}g", fmt_num(p.protein)),
                    })
                    .collect();
                print_table(&rows, 1);
            }
        }
        ChartKind::Body => {
            let trend = svc.body_trend();
            if json {
                println!("{}", serde_json::to_string_pretty(&trend)?);
            } else {
                if trend.is_empty() {
                    empty_exit();
                }
                let unit = svc.state().unit;
                let rows: Vec<BodyRow> = trend
                    .iter()
                    .map(|e| BodyRow {
                        date: e.date.clone(),
                        weight: format!(
                            "{} {}",
                            fmt_num(unit.display_weight(e.weight)),
                            unit.weight_label()
                        ),
                        fat: fmt_num(e.fat),
                        muscle: fmt_num(e.muscle),
                    })
                    .collect();
                print_table(&rows, 1);
            }
        }
        ChartKind::Insights => {
            let series = svc.insights();
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                if series.is_empty() {
                    empty_exit();
                }
                let unit = svc.state().unit;
                let rows: Vec<InsightRow> = series
                    .iter()
                    .map(|p| InsightRow {
                        date: p.date.clone(),
                        volume: fmt_num(p.gym_volume),
                        calories: fmt_num(p.calories),
                        weight: p.weight.map_or_else(
                            || "-".to_string(),
                            |w| format!("{} {}", fmt_num(unit.display_weight(w)), unit.weight_label()),
                        ),
                    })
                    .collect();
                print_table(&rows, 1);
            }
        }
    }

    Ok(())
}
