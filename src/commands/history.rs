use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    catalog::Catalog,
    cli::HistoryCmd,
    completion,
    models::{CompletedExercise, CompletedSet, WorkoutHistoryEntry},
    store, strength,
    types::{Effort, OutputFmt, emit},
};

pub async fn handle(cmd: HistoryCmd, pool: &SqlitePool, fmt: OutputFmt) -> Result<()> {
    let catalog = Catalog::builtin();

    match cmd {
        HistoryCmd::List => {
            let entries = store::history_newest_first(pool).await?;

            emit(fmt, &entries, || {
                if entries.is_empty() {
                    println!("{}", "(no completed workouts yet)".dimmed());
                    return;
                }

                println!("{}", "History:".cyan().bold());
                for entry in &entries {
                    println!(
                        "{} • {} — {} min, {} exercises",
                        format!("#{}", entry.workout_number).yellow(),
                        entry.completed_date.format("%Y-%m-%d %H:%M"),
                        entry.total_duration,
                        entry
                            .exercises
                            .iter()
                            .filter(|ex| !ex.completed_sets.is_empty())
                            .count()
                    );
                }
            })
        }

        HistoryCmd::Show { number } => {
            let Some(entry) = store::history_by_number(pool, number).await? else {
                println!(
                    "{} no workout #{} in history",
                    "error:".red().bold(),
                    number
                );
                return Ok(());
            };

            emit(fmt, &entry, || print_entry(&entry))
        }

        HistoryCmd::Add { date, duration, exercises } => {
            let completed_date = match date {
                Some(d) => match format!("{}T12:00:00Z", d).parse::<DateTime<Utc>>() {
                    Ok(dt) => dt,
                    Err(_) => {
                        println!(
                            "{} invalid date `{}` — expected YYYY-MM-DD",
                            "error:".red().bold(),
                            d
                        );
                        return Ok(());
                    }
                },
                None => Utc::now(),
            };

            let mut performed: Vec<CompletedExercise> = Vec::new();

            for raw in &exercises {
                let Some((id, values)) = raw.split_once('=') else {
                    println!(
                        "{} `{}` is not of the form EXERCISE=V1,V2,...",
                        "error:".red().bold(),
                        raw
                    );
                    return Ok(());
                };

                let Some(def) = catalog.get(id.trim()) else {
                    println!(
                        "{} unknown exercise `{}` — see `tonus ex list`",
                        "error:".red().bold(),
                        id.trim()
                    );
                    return Ok(());
                };

                let mut sets: Vec<CompletedSet> = Vec::new();
                for value in values.split(',') {
                    let value: i64 = match value.trim().parse() {
                        Ok(v) if v > 0 => v,
                        _ => {
                            println!(
                                "{} `{}` needs positive set values",
                                "error:".red().bold(),
                                raw
                            );
                            return Ok(());
                        }
                    };

                    sets.push(CompletedSet {
                        set_number: sets.len() as u32 + 1,
                        actual: Effort::of(def.kind, value as u32),
                    });
                }

                performed.push(CompletedExercise {
                    exercise_id: def.id.clone(),
                    exercise_name: def.name.clone(),
                    muscle_groups: def.muscle_groups.clone(),
                    completed_sets: sets,
                });
            }

            // Manual entries never existed as a live workout; the reference
            // id is fresh.
            let entry = WorkoutHistoryEntry {
                id: Uuid::new_v4().to_string(),
                workout_id: Uuid::new_v4().to_string(),
                workout_number: 0, // assigned by the renumber below
                completed_date,
                total_duration: duration,
                exercises: performed,
            };

            let mut all = store::history_newest_first(pool).await?;
            all.push(entry.clone());
            completion::renumber(&mut all);
            store::put_history_all(pool, &all).await?;

            // Manual entries feed the strength model like any completion.
            apply_strength(pool, catalog, &entry).await?;

            let number = all
                .iter()
                .find(|e| e.id == entry.id)
                .map(|e| e.workout_number)
                .unwrap_or(0);
            println!(
                "{} recorded workout #{} ({})",
                "ok:".green().bold(),
                number,
                completed_date.format("%Y-%m-%d")
            );

            Ok(())
        }

        HistoryCmd::Edit { number, exercise, set, value, remove } => {
            let Some(mut entry) = store::history_by_number(pool, number).await? else {
                println!(
                    "{} no workout #{} in history",
                    "error:".red().bold(),
                    number
                );
                return Ok(());
            };

            if remove == value.is_some() {
                println!(
                    "{} pass either --value or --remove",
                    "error:".red().bold()
                );
                return Ok(());
            }

            {
                let Some(ex) = exercise
                    .checked_sub(1)
                    .and_then(|i| entry.exercises.get_mut(i))
                else {
                    println!(
                        "{} no exercise at index {}",
                        "error:".red().bold(),
                        exercise
                    );
                    return Ok(());
                };

                let Some(idx) = ex.completed_sets.iter().position(|s| s.set_number == set)
                else {
                    println!(
                        "{} no set {} in {}",
                        "error:".red().bold(),
                        set,
                        ex.exercise_name
                    );
                    return Ok(());
                };

                if remove {
                    ex.completed_sets.remove(idx);
                    completion::renumber_sets(ex);
                } else if let Some(v) = value {
                    if v <= 0 {
                        println!(
                            "{} set value must be a positive number",
                            "error:".red().bold()
                        );
                        return Ok(());
                    }
                    let kind = ex.completed_sets[idx].actual.kind();
                    ex.completed_sets[idx].actual = Effort::of(kind, v as u32);
                }
            }

            let mut all = store::history_newest_first(pool).await?;
            if let Some(slot) = all.iter_mut().find(|e| e.id == entry.id) {
                *slot = entry.clone();
            }
            completion::renumber(&mut all);
            store::put_history_all(pool, &all).await?;

            // A fresh strength pass over the edited entry, stacked on the
            // current levels the same way completions are reconciled.
            apply_strength(pool, catalog, &entry).await?;

            println!("{} updated workout #{}", "ok:".green().bold(), number);

            Ok(())
        }

        HistoryCmd::Delete { number, yes } => {
            let Some(entry) = store::history_by_number(pool, number).await? else {
                println!(
                    "{} no workout #{} in history",
                    "error:".red().bold(),
                    number
                );
                return Ok(());
            };

            if !yes {
                println!(
                    "{} this removes workout #{} from history — re-run with --yes",
                    "warning:".yellow().bold(),
                    number
                );
                return Ok(());
            }

            // Strength credit already earned stays; deletion reverses nothing.
            store::delete_history(pool, &entry.id).await?;
            println!("{} deleted workout #{}", "ok:".green().bold(), number);

            Ok(())
        }
    }
}

async fn apply_strength(
    pool: &SqlitePool,
    catalog: &Catalog,
    entry: &WorkoutHistoryEntry,
) -> Result<()> {
    if let Some(mut profile) = store::load_profile(pool).await? {
        profile.strength = strength::apply_workout(catalog, &profile.strength, &entry.exercises);
        store::save_profile(pool, &profile).await?;
    }

    Ok(())
}

fn print_entry(entry: &WorkoutHistoryEntry) {
    println!(
        "{} #{} — {} ({} min)",
        "Workout:".cyan().bold(),
        entry.workout_number,
        entry.completed_date.format("%Y-%m-%d %H:%M"),
        entry.total_duration
    );

    for (i, ex) in entry.exercises.iter().enumerate() {
        let idx = format!("{}", i + 1).yellow();
        println!("{} • {}", idx, ex.exercise_name.bold());

        if ex.completed_sets.is_empty() {
            println!("    {}", "(no sets recorded)".dimmed());
            continue;
        }

        for set in &ex.completed_sets {
            println!(
                "    {} • {}",
                format!("{}", set.set_number).yellow(),
                set.actual
            );
        }
    }
}
