use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;

use crate::{
    catalog::{Catalog, Exercise},
    cli::ExerciseCmd,
    types::{EffortKind, OutputFmt, emit},
};

fn kind_label(kind: EffortKind) -> &'static str {
    match kind {
        EffortKind::Reps => "reps",
        EffortKind::Timed => "timed",
    }
}

pub fn handle(cmd: ExerciseCmd, fmt: OutputFmt) -> Result<()> {
    let catalog = Catalog::builtin();

    match cmd {
        ExerciseCmd::List { muscle } => {
            let exercises: Vec<&Exercise> = match muscle {
                Some(group) => catalog.by_muscle_group(group),
                None => catalog.all().iter().collect(),
            };

            emit(fmt, &exercises, || {
                println!("{}", "Exercises:".cyan().bold());
                for ex in &exercises {
                    let groups = ex.muscle_groups.iter().map(|g| g.to_string()).join(", ");
                    let band = ex
                        .equipment
                        .map(|e| format!(" [{}]", e).yellow().to_string())
                        .unwrap_or_default();

                    println!(
                        "• {:<24} {:<5} {}{}",
                        ex.id,
                        kind_label(ex.kind),
                        format!("({})", groups).dimmed(),
                        band
                    );
                }
            })
        }

        ExerciseCmd::Show { exercise } => {
            let Some(ex) = catalog.get(&exercise) else {
                println!(
                    "{} unknown exercise `{}` — see `tonus ex list`",
                    "error:".red().bold(),
                    exercise
                );
                return Ok(());
            };

            emit(fmt, ex, || {
                println!("{} ({})", ex.name.bold(), kind_label(ex.kind));
                if let Some(desc) = &ex.description {
                    println!("{}", desc.dimmed());
                }

                println!("\n{}", "Muscle groups:".cyan().bold());
                for group in &ex.muscle_groups {
                    let primary = if *group == ex.primary_group() {
                        " (primary)".dimmed().to_string()
                    } else {
                        String::new()
                    };
                    let heaviness = ex.heaviness_for(*group).unwrap_or(0);
                    println!("  {:<11} heaviness {}/10{}", group.to_string(), heaviness, primary);
                }

                if let Some(equipment) = ex.equipment {
                    println!("\n{} {}", "Requires:".cyan().bold(), equipment);
                }

                match (ex.default_reps, ex.default_duration) {
                    (Some(reps), _) => println!("\nSuggested calibration start: {} reps", reps),
                    (_, Some(secs)) => println!("\nSuggested calibration start: {}s", secs),
                    _ => {}
                }
            })
        }
    }
}
