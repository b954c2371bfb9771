use anyhow::{Result, bail};

use fitlog_core::models::{Goals, UnitPreference};
use fitlog_core::service::TrackerService;

use super::helpers::fmt_num;

fn print_settings(svc: &TrackerService) {
    let state = svc.state();
    let unit = state.unit;
    println!("Units:   {unit}");
    println!("Goals:");
    println!("  Calories  {} kcal", fmt_num(state.goals.calories));
    println!("  Protein   {} g", fmt_num(state.goals.protein));
    println!(
        "  Weight    {} {}",
        fmt_num(unit.display_weight(state.goals.weight)),
        unit.weight_label()
    );
}

fn settings_json(svc: &TrackerService) -> serde_json::Value {
    serde_json::json!({
        "unit": svc.state().unit,
        "goals": svc.state().goals,
        "plan": svc.plan(),
    })
}

pub(crate) fn cmd_settings_show(svc: &TrackerService, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&settings_json(svc))?);
    } else {
        print_settings(svc);
    }
    Ok(())
}

pub(crate) fn cmd_settings_unit(
    svc: &mut TrackerService,
    unit: UnitPreference,
    json: bool,
) -> Result<()> {
    svc.set_unit(unit);
    if json {
        println!("{}", serde_json::to_string_pretty(&settings_json(svc))?);
    } else {
        println!("Units set to {unit}");
    }
    Ok(())
}

/// Goal weight is entered in kilograms regardless of the display unit.
pub(crate) fn cmd_settings_goals(
    svc: &mut TrackerService,
    calories: Option<f64>,
    protein: Option<f64>,
    weight: Option<f64>,
    json: bool,
) -> Result<()> {
    if calories.is_none() && protein.is_none() && weight.is_none() {
        bail!("Nothing to update. Pass --calories, --protein, or --weight");
    }
    for (name, value) in [("calories", calories), ("protein", protein), ("weight", weight)] {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            bail!("Goal {name} must be a non-negative number");
        }
    }

    let current = &svc.state().goals;
    let goals = Goals {
        calories: calories.unwrap_or(current.calories),
        protein: protein.unwrap_or(current.protein),
        weight: weight.unwrap_or(current.weight),
    };
    svc.set_goals(goals);

    if json {
        println!("{}", serde_json::to_string_pretty(&settings_json(svc))?);
    } else {
        print_settings(svc);
    }
    Ok(())
}
