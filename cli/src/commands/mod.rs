mod backup;
mod body;
mod chart;
mod exercise;
mod food;
mod gym;
mod helpers;
mod nutrition;
mod settings;
mod summary;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

pub(crate) use backup::{cmd_backup, cmd_restore};
pub(crate) use body::{BodyArgs, cmd_body_delete, cmd_body_export, cmd_body_list, cmd_body_log};
pub(crate) use chart::{ChartKind, cmd_chart};
pub(crate) use exercise::{
    cmd_exercise_add, cmd_exercise_list, cmd_exercise_remove, cmd_exercise_tag, cmd_exercise_tags,
};
pub(crate) use food::{cmd_food_add, cmd_food_import, cmd_food_list, cmd_food_remove};
pub(crate) use gym::{cmd_gym_delete, cmd_gym_export, cmd_gym_list, cmd_gym_log};
pub(crate) use nutrition::{
    cmd_nutrition_delete, cmd_nutrition_export, cmd_nutrition_list, cmd_nutrition_log,
};
pub(crate) use settings::{cmd_settings_goals, cmd_settings_show, cmd_settings_unit};
pub(crate) use summary::{cmd_calendar, cmd_day, cmd_overview, cmd_plan};

/// Create `path`, hand a buffered writer to `write`, and report the row count.
pub(super) fn export_csv<F>(path: &Path, json: bool, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<usize>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let rows = write(&mut out)?;
    out.flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "path": path.display().to_string(), "rows": rows })
        );
    } else {
        println!("Exported {rows} rows to {}", path.display());
    }

    Ok(())
}
