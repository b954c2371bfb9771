use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use fitlog_core::backup::{RestoreSummary, to_json};
use fitlog_core::service::TrackerService;

pub(crate) fn cmd_backup(svc: &TrackerService, path: &Path, json: bool) -> Result<()> {
    let data = svc.export_backup();
    let body = to_json(&data)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write backup: {}", path.display()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.display().to_string(),
                "exported_at": data.exported_at,
            })
        );
    } else {
        println!("Backup written to {}", path.display());
    }
    Ok(())
}

fn describe(summary: &RestoreSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.unit {
        lines.push("unit preference".to_string());
    }
    if summary.goals {
        lines.push("goals".to_string());
    }
    let counts = [
        ("exercises", summary.exercises),
        ("foods", summary.foods),
        ("gym entries", summary.gym_entries),
        ("nutrition entries", summary.nutrition_entries),
        ("body entries", summary.body_entries),
    ];
    for (label, count) in counts {
        if let Some(n) = count {
            lines.push(format!("{n} {label}"));
        }
    }
    lines
}

pub(crate) fn cmd_restore(svc: &mut TrackerService, path: &Path, json: bool) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open backup: {}", path.display()))?;
    let summary = svc
        .restore_backup(BufReader::new(file))
        .with_context(|| format!("Could not restore {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.is_empty() {
        println!("Backup contained no recognised keys. Nothing restored.");
    } else {
        println!("Restored from {}:", path.display());
        for line in describe(&summary) {
            println!("  {line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_replaced_parts() {
        let summary = RestoreSummary {
            goals: true,
            foods: Some(3),
            body_entries: Some(0),
            ..RestoreSummary::default()
        };
        assert_eq!(describe(&summary), vec!["goals", "3 foods", "0 body entries"]);
    }

    #[test]
    fn test_describe_empty_summary() {
        assert!(describe(&RestoreSummary::default()).is_empty());
    }
}
