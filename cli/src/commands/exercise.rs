use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use fitlog_core::models::ExerciseTag;
use fitlog_core::service::TrackerService;

use super::helpers::{empty_table, json_error, print_exercise_table, report_deleted};

pub(crate) fn cmd_exercise_add(
    svc: &mut TrackerService,
    name: &str,
    tags: &[ExerciseTag],
    json: bool,
) -> Result<()> {
    let exercise = svc.add_exercise(name, tags)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exercise)?);
    } else {
        println!("Added exercise: {} (ID: {})", exercise.name, exercise.id);
    }

    Ok(())
}

pub(crate) fn cmd_exercise_list(
    svc: &TrackerService,
    tag: Option<ExerciseTag>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let exercises = svc.list_exercises(tag, search);

    if empty_table(exercises.len(), json) {
        eprintln!("No exercises found");
        std::process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&exercises)?);
    } else {
        print_exercise_table(&exercises);
    }

    Ok(())
}

pub(crate) fn cmd_exercise_remove(svc: &mut TrackerService, id: &str, json: bool) -> Result<()> {
    let removed = svc.remove_exercise(id);
    report_deleted("exercise", id, removed, json);
    Ok(())
}

pub(crate) fn cmd_exercise_tag(
    svc: &mut TrackerService,
    id: &str,
    tag: ExerciseTag,
    json: bool,
) -> Result<()> {
    let Some(exercise) = svc.toggle_exercise_tag(id, tag) else {
        if json {
            println!("{}", json_error(&format!("No exercise with ID {id}")));
        } else {
            eprintln!("No exercise with ID {id}");
        }
        std::process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&exercise)?);
    } else {
        let state = if exercise.has_tag(tag) { "Tagged" } else { "Untagged" };
        println!("{state} {} as {}", exercise.name, tag.label());
    }

    Ok(())
}

pub(crate) fn cmd_exercise_tags(json: bool) -> Result<()> {
    #[derive(Tabled, serde::Serialize)]
    struct TagRow {
        #[tabled(rename = "Key")]
        key: &'static str,
        #[tabled(rename = "Label")]
        label: &'static str,
        #[tabled(rename = "Colour")]
        color: &'static str,
    }

    let rows: Vec<TagRow> = ExerciseTag::ALL
        .iter()
        .map(|t| TagRow {
            key: t.key(),
            label: t.label(),
            color: t.color(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    Ok(())
}
