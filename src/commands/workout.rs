use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use itertools::Itertools;
use sqlx::SqlitePool;

use crate::{
    catalog::Catalog,
    cli::WorkoutCmd,
    completion,
    generator::{self, GenerateOptions},
    models::{Workout, WorkoutStatus},
    store, strength,
    types::{Effort, MuscleGroup, OutputFmt, emit},
};

pub async fn handle(cmd: WorkoutCmd, pool: &SqlitePool, fmt: OutputFmt) -> Result<()> {
    let catalog = Catalog::builtin();

    match cmd {
        WorkoutCmd::Generate => {
            let profile = match store::load_profile(pool).await? {
                Some(p) if p.calibration_completed => p,
                Some(_) => {
                    println!(
                        "{} profile is not calibrated yet — run `tonus profile calibrate` first",
                        "error:".red().bold()
                    );
                    return Ok(());
                }
                None => {
                    println!(
                        "{} no profile — run `tonus profile init` to get started",
                        "error:".red().bold()
                    );
                    return Ok(());
                }
            };

            // One active workout at a time.
            if let Some(active) = store::current_workout(pool).await? {
                println!(
                    "{} workout #{} is still {} — complete or cancel it first",
                    "error:".red().bold(),
                    active.workout_number,
                    active.status
                );
                return Ok(());
            }

            let recent = store::recent_workouts(pool, 2).await?;
            let recent_ids = generator::recent_exercise_ids(&recent);
            let history = store::history_newest_first(pool).await?;
            let workout_number = store::workout_count(pool).await? + 1;

            let opts = GenerateOptions {
                workout_number,
                strength: &profile.strength,
                recent_exercise_ids: &recent_ids,
                history: &history,
                has_elastic_bands: profile.has_elastic_bands,
            };

            // An empty candidate pool is a hard failure, not a user slip.
            let workout = generator::generate_workout(catalog, &opts, &mut rand::thread_rng())?;
            store::add_workout(pool, &workout).await?;

            println!(
                "{} workout #{} generated (~{} min)",
                "ok:".green().bold(),
                workout.workout_number,
                workout.estimated_duration
            );
            print_plan(&workout);

            Ok(())
        }

        WorkoutCmd::Show => {
            let Some(workout) = store::current_workout(pool).await? else {
                println!(
                    "{} no active workout — run `tonus workout generate`",
                    "error:".red().bold()
                );
                return Ok(());
            };

            emit(fmt, &workout, || {
                println!(
                    "{} #{} — {} (~{} min, generated {})",
                    "Workout:".cyan().bold(),
                    workout.workout_number,
                    workout.status,
                    workout.estimated_duration,
                    workout.generated_date.format("%Y-%m-%d %H:%M")
                );
                print_plan(&workout);
            })
        }

        WorkoutCmd::Start => {
            let Some(mut workout) = store::current_workout(pool).await? else {
                println!(
                    "{} no active workout — run `tonus workout generate`",
                    "error:".red().bold()
                );
                return Ok(());
            };

            if workout.status != WorkoutStatus::Pending {
                println!(
                    "{} workout #{} was already started",
                    "warning:".yellow().bold(),
                    workout.workout_number
                );
                return Ok(());
            }

            workout.status = WorkoutStatus::InProgress;
            workout.started_date = Some(Utc::now());
            store::put_workout(pool, &workout).await?;

            println!(
                "{} workout #{} started — log sets with `tonus workout log EXERCISE VALUE`",
                "ok:".green().bold(),
                workout.workout_number
            );

            Ok(())
        }

        WorkoutCmd::Log { exercise, value, set } => {
            let Some(mut workout) = store::current_workout(pool).await? else {
                println!("{} no active workout", "error:".red().bold());
                return Ok(());
            };

            if workout.status == WorkoutStatus::Pending {
                println!(
                    "{} start the workout first with `tonus workout start`",
                    "error:".red().bold()
                );
                return Ok(());
            }

            // Invalid input never mutates state.
            if value <= 0 {
                println!(
                    "{} set value must be a positive number of reps or seconds",
                    "error:".red().bold()
                );
                return Ok(());
            }

            let (name, target, set_number);
            {
                let Some(ex) = exercise
                    .checked_sub(1)
                    .and_then(|i| workout.exercises.get_mut(i))
                else {
                    println!(
                        "{} no exercise at index {}",
                        "error:".red().bold(),
                        exercise
                    );
                    return Ok(());
                };

                let set_idx = match set {
                    Some(s) => match s.checked_sub(1) {
                        Some(i) if i < ex.sets.len() => i,
                        _ => {
                            println!(
                                "{} no set {} (exercise has {})",
                                "error:".red().bold(),
                                s,
                                ex.sets.len()
                            );
                            return Ok(());
                        }
                    },
                    None => match ex.sets.iter().position(|s| s.actual.is_none()) {
                        Some(i) => i,
                        None => {
                            println!(
                                "{} every set is already logged — pass --set to overwrite one",
                                "warning:".yellow().bold()
                            );
                            return Ok(());
                        }
                    },
                };

                let logged = Effort::of(ex.sets[set_idx].target.kind(), value as u32);
                ex.sets[set_idx].actual = Some(logged);
                ex.sets[set_idx].completed = true;

                name = ex.exercise_name.clone();
                target = ex.sets[set_idx].target;
                set_number = ex.sets[set_idx].set_number;
            }

            store::put_workout(pool, &workout).await?;

            println!(
                "{} logged {} set {} — {} (target {})",
                "ok:".green().bold(),
                name.bold(),
                set_number,
                Effort::of(target.kind(), value as u32),
                target
            );

            Ok(())
        }

        WorkoutCmd::Complete => {
            let Some(mut workout) = store::current_workout(pool).await? else {
                println!("{} no active workout", "error:".red().bold());
                return Ok(());
            };

            if workout.status == WorkoutStatus::Pending {
                println!(
                    "{} workout #{} was never started — start and log it, or cancel it",
                    "error:".red().bold(),
                    workout.workout_number
                );
                return Ok(());
            }

            let completed_date = Utc::now();
            workout.status = WorkoutStatus::Completed;
            workout.completed_date = Some(completed_date);
            workout.total_duration =
                Some(completion::total_duration_minutes(&workout, completed_date));

            let entry = completion::build_history_entry(&workout, completed_date);

            store::put_workout(pool, &workout).await?;
            store::add_history(pool, &entry).await?;

            // Strength reconciliation, exactly once per completed workout.
            let done = completion::completed_exercises(&workout);
            if let Some(mut profile) = store::load_profile(pool).await? {
                let before = profile.strength.clone();
                profile.strength = strength::apply_workout(catalog, &before, &done);
                store::save_profile(pool, &profile).await?;

                println!(
                    "{} workout #{} completed in {} min",
                    "ok:".green().bold(),
                    workout.workout_number,
                    entry.total_duration
                );
                for ex in &entry.exercises {
                    println!(
                        "• {} — {} sets recorded",
                        ex.exercise_name.bold(),
                        ex.completed_sets.len()
                    );
                }

                println!("\n{}", "Strength:".cyan().bold());
                for group in MuscleGroup::ALL {
                    let (old, new) = (before.get(group), profile.strength.get(group));
                    let delta = if new > old {
                        format!(" (+{})", new - old).green().to_string()
                    } else {
                        String::new()
                    };
                    println!("  {:<11} {:>3}{}", group.to_string(), new, delta);
                }
            } else {
                println!(
                    "{} workout #{} completed in {} min (no profile to update)",
                    "ok:".green().bold(),
                    workout.workout_number,
                    entry.total_duration
                );
            }

            Ok(())
        }

        WorkoutCmd::Cancel => {
            let Some(workout) = store::current_workout(pool).await? else {
                println!("{} no active workout to cancel", "error:".red().bold());
                return Ok(());
            };

            store::delete_workout(pool, &workout.id).await?;
            println!(
                "{} workout #{} cancelled",
                "ok:".green().bold(),
                workout.workout_number
            );

            Ok(())
        }
    }
}

fn print_plan(workout: &Workout) {
    println!("\n{}", "Exercises:".cyan().bold());

    for (i, ex) in workout.exercises.iter().enumerate() {
        let idx = format!("{}", i + 1).yellow();
        let groups = ex.muscle_groups.iter().map(|g| g.to_string()).join(", ");

        println!(
            "{} • {} {} — {} sets, rest {}s",
            idx,
            ex.exercise_name.bold(),
            format!("({})", groups).dimmed(),
            ex.sets.len(),
            ex.rest_time
        );

        for set in &ex.sets {
            let done = match (set.completed, set.actual) {
                (true, Some(actual)) => actual.to_string().green().to_string(),
                _ => "—".dimmed().to_string(),
            };
            println!(
                "    {} • target {:<9} | {}",
                format!("{}", set.set_number).yellow(),
                set.target.to_string(),
                done
            );
        }
    }
}
