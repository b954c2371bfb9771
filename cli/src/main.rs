mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{
    BodyArgs, ChartKind, cmd_backup, cmd_body_delete, cmd_body_export, cmd_body_list,
    cmd_body_log, cmd_calendar, cmd_chart, cmd_day, cmd_exercise_add, cmd_exercise_list,
    cmd_exercise_remove, cmd_exercise_tag, cmd_exercise_tags, cmd_food_add, cmd_food_import,
    cmd_food_list, cmd_food_remove, cmd_gym_delete, cmd_gym_export, cmd_gym_list, cmd_gym_log,
    cmd_nutrition_delete, cmd_nutrition_export, cmd_nutrition_list, cmd_nutrition_log,
    cmd_overview, cmd_plan, cmd_restore, cmd_settings_goals, cmd_settings_show,
    cmd_settings_unit,
};
use crate::config::Config;
use fitlog_core::models::{ExerciseTag, UnitPreference};
use fitlog_core::service::TrackerService;

#[derive(Parser)]
#[command(
    name = "fitlog",
    version,
    about = "Track workouts, food, and body measurements",
    long_about = "Track workouts, food, and body measurements.\n\n\
        Everything is stored locally. Run `fitlog overview` to see today at a glance."
)]
struct Cli {
    /// Directory holding the database (default: platform data dir)
    #[arg(long, global = true, env = "FITLOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the exercise library
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Manage the food library
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log and review workouts
    Gym {
        #[command(subcommand)]
        command: GymCommands,
    },
    /// Log and review food intake
    Nutrition {
        #[command(subcommand)]
        command: NutritionCommands,
    },
    /// Log and review body measurements
    Body {
        #[command(subcommand)]
        command: BodyCommands,
    },
    /// Show goals progress and plan completion for a day
    Overview {
        /// Date to show (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show training plan completion
    Plan {
        /// Plan start date (YYYY-MM-DD, default: from config)
        #[arg(long)]
        start: Option<String>,
        /// Plan end date (YYYY-MM-DD, default: from config)
        #[arg(long)]
        end: Option<String>,
        /// Target sessions per week
        #[arg(long)]
        per_week: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show everything logged on one day
    Day {
        /// Date to show (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month, or a whole year, with logged days marked
    Calendar {
        /// Year; given without --month, shows all twelve months (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a chart series
    Chart {
        /// Series to print
        #[arg(value_enum)]
        kind: ChartKind,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// View or change units and goals
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Write a full backup to a JSON file
    Backup {
        /// Output file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore from a JSON backup, replacing the keys it contains
    Restore {
        /// Backup file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Add an exercise
    Add {
        /// Exercise name
        name: String,
        /// Muscle-group tag (repeatable): legs, biceps, triceps, chest, back, shoulders, core
        #[arg(short, long = "tag")]
        tags: Vec<ExerciseTag>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List exercises
    List {
        /// Only exercises with this tag
        #[arg(short, long)]
        tag: Option<ExerciseTag>,
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an exercise (logged entries are kept)
    Remove {
        /// Exercise ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a tag on an exercise
    Tag {
        /// Exercise ID
        id: String,
        /// Tag to toggle
        tag: ExerciseTag,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the tag palette
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a food (values per serving)
    Add {
        /// Food name
        name: String,
        /// Calories per serving
        #[arg(long)]
        calories: Option<f64>,
        /// Protein per serving (g)
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs per serving (g)
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat per serving (g)
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List foods
    List {
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a food (logged entries are kept)
    Remove {
        /// Food ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import foods from a JSON file, skipping names already present
    Import {
        /// Path to the JSON file
        file: PathBuf,
        /// Preview without saving
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GymCommands {
    /// Log a set block for an exercise
    Log {
        /// Exercise ID
        exercise_id: String,
        /// Number of sets
        #[arg(long)]
        sets: f64,
        /// Reps per set
        #[arg(long)]
        reps: f64,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show workouts grouped by day and exercise
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a gym entry
    Delete {
        /// Entry ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the gym log as CSV
    Export {
        /// Output file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NutritionCommands {
    /// Log servings of a food
    Log {
        /// Food ID
        food_id: String,
        /// Number of servings (default: 1)
        #[arg(short, long)]
        qty: Option<f64>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show food intake grouped by day
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a nutrition entry
    Delete {
        /// Entry ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the nutrition log as CSV
    Export {
        /// Output file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BodyCommands {
    /// Log body measurements (kg and cm)
    Log {
        /// Body weight (kg)
        #[arg(long)]
        weight: Option<f64>,
        /// Height (cm)
        #[arg(long)]
        height: Option<f64>,
        /// Muscle mass (%)
        #[arg(long)]
        muscle: Option<f64>,
        /// Body fat (%)
        #[arg(long)]
        fat: Option<f64>,
        /// Waist (cm)
        #[arg(long)]
        waist: Option<f64>,
        /// Arms (cm)
        #[arg(long)]
        arms: Option<f64>,
        /// Chest (cm)
        #[arg(long)]
        chest: Option<f64>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show measurements, oldest first, in the preferred units
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a body entry
    Delete {
        /// Entry ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the body log as CSV
    Export {
        /// Output file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show units, goals, and the plan window
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set display units: metric or imperial
    Unit {
        /// metric or imperial
        unit: UnitPreference,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update daily goals (unset values keep their current setting)
    Goals {
        /// Daily calories
        #[arg(long)]
        calories: Option<f64>,
        /// Daily protein (g)
        #[arg(long)]
        protein: Option<f64>,
        /// Target body weight (kg)
        #[arg(long)]
        weight: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir)?;
    init_tracing(&config.log_level);
    tracing::debug!(data_dir = %config.data_dir.display(), "Opening tracker");
    let mut svc = TrackerService::new(&config.db_path)?.with_plan(config.plan);

    match cli.command {
        Commands::Exercise { command } => match command {
            ExerciseCommands::Add { name, tags, json } => {
                cmd_exercise_add(&mut svc, &name, &tags, json)
            }
            ExerciseCommands::List { tag, search, json } => {
                cmd_exercise_list(&svc, tag, search.as_deref(), json)
            }
            ExerciseCommands::Remove { id, json } => cmd_exercise_remove(&mut svc, &id, json),
            ExerciseCommands::Tag { id, tag, json } => cmd_exercise_tag(&mut svc, &id, tag, json),
            ExerciseCommands::Tags { json } => cmd_exercise_tags(json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_food_add(&mut svc, &name, calories, protein, carbs, fat, json),
            FoodCommands::List { search, json } => cmd_food_list(&svc, search.as_deref(), json),
            FoodCommands::Remove { id, json } => cmd_food_remove(&mut svc, &id, json),
            FoodCommands::Import {
                file,
                dry_run,
                json,
            } => cmd_food_import(&mut svc, &file, dry_run, json),
        },
        Commands::Gym { command } => match command {
            GymCommands::Log {
                exercise_id,
                sets,
                reps,
                weight,
                date,
                notes,
                json,
            } => cmd_gym_log(
                &mut svc,
                &exercise_id,
                sets,
                reps,
                weight,
                date,
                notes,
                json,
            ),
            GymCommands::List { json } => cmd_gym_list(&svc, json),
            GymCommands::Delete { id, json } => cmd_gym_delete(&mut svc, &id, json),
            GymCommands::Export { file, json } => cmd_gym_export(&svc, &file, json),
        },
        Commands::Nutrition { command } => match command {
            NutritionCommands::Log {
                food_id,
                qty,
                date,
                notes,
                json,
            } => cmd_nutrition_log(&mut svc, &food_id, qty, date, notes, json),
            NutritionCommands::List { json } => cmd_nutrition_list(&svc, json),
            NutritionCommands::Delete { id, json } => cmd_nutrition_delete(&mut svc, &id, json),
            NutritionCommands::Export { file, json } => cmd_nutrition_export(&svc, &file, json),
        },
        Commands::Body { command } => match command {
            BodyCommands::Log {
                weight,
                height,
                muscle,
                fat,
                waist,
                arms,
                chest,
                date,
                notes,
                json,
            } => {
                let args = BodyArgs {
                    weight,
                    height,
                    muscle,
                    fat,
                    waist,
                    arms,
                    chest,
                };
                cmd_body_log(&mut svc, &args, date, notes, json)
            }
            BodyCommands::List { json } => cmd_body_list(&svc, json),
            BodyCommands::Delete { id, json } => cmd_body_delete(&mut svc, &id, json),
            BodyCommands::Export { file, json } => cmd_body_export(&svc, &file, json),
        },
        Commands::Overview { date, json } => cmd_overview(&svc, date, json),
        Commands::Plan {
            start,
            end,
            per_week,
            json,
        } => cmd_plan(&svc, start, end, per_week, json),
        Commands::Day { date, json } => cmd_day(&svc, date, json),
        Commands::Calendar { year, month, json } => cmd_calendar(&svc, year, month, json),
        Commands::Chart { kind, json } => cmd_chart(&svc, kind, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&svc, json),
            SettingsCommands::Unit { unit, json } => cmd_settings_unit(&mut svc, unit, json),
            SettingsCommands::Goals {
                calories,
                protein,
                weight,
                json,
            } => cmd_settings_goals(&mut svc, calories, protein, weight, json),
        },
        Commands::Backup { file, json } => cmd_backup(&svc, &file, json),
        Commands::Restore { file, json } => cmd_restore(&mut svc, &file, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_repeated_tags() {
        let cli = Cli::try_parse_from([
            "fitlog", "exercise", "add", "Bench", "--tag", "chest", "--tag", "triceps",
        ])
        .unwrap();
        let Commands::Exercise {
            command: ExerciseCommands::Add { tags, .. },
        } = cli.command
        else {
            panic!("expected exercise add");
        };
        assert_eq!(tags, vec![ExerciseTag::Chest, ExerciseTag::Triceps]);
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["fitlog", "settings", "unit", "stones"]).is_err());
    }

    #[test]
    fn test_chart_kind_names() {
        let cli = Cli::try_parse_from(["fitlog", "chart", "gym-max", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chart {
                kind: ChartKind::GymMax,
                json: true
            }
        ));
    }
}
