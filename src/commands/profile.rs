use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use sqlx::SqlitePool;

use crate::{
    catalog::Catalog,
    cli::ProfileCmd,
    models::{CalibrationData, CalibrationEntry, StrengthLevels, UserProfile},
    store, strength,
    types::{Effort, MuscleGroup, OutputFmt, emit},
};

pub async fn handle(cmd: ProfileCmd, pool: &SqlitePool, fmt: OutputFmt) -> Result<()> {
    let catalog = Catalog::builtin();

    match cmd {
        ProfileCmd::Init => {
            if store::load_profile(pool).await?.is_some() {
                println!("{} profile already exists", "warning:".yellow().bold());
                return Ok(());
            }

            store::save_profile(pool, &UserProfile::new(Utc::now())).await?;
            println!(
                "{} profile created — run `tonus profile calibrate` to measure your baseline",
                "ok:".green().bold()
            );

            Ok(())
        }

        ProfileCmd::Calibrate { entries } => {
            let mut parsed: Vec<CalibrationEntry> = Vec::new();

            for raw in &entries {
                let Some((id, value)) = raw.split_once('=') else {
                    println!(
                        "{} `{}` is not of the form EXERCISE=VALUE",
                        "error:".red().bold(),
                        raw
                    );
                    return Ok(());
                };

                let value: i64 = match value.trim().parse() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        println!(
                            "{} `{}` needs a positive number of reps or seconds",
                            "error:".red().bold(),
                            raw
                        );
                        return Ok(());
                    }
                };

                let Some(exercise) = catalog.get(id.trim()) else {
                    println!(
                        "{} unknown exercise `{}` — see `tonus ex list`",
                        "error:".red().bold(),
                        id.trim()
                    );
                    return Ok(());
                };

                let group = exercise.primary_group();
                if parsed.iter().any(|e| e.muscle_group == group) {
                    println!(
                        "{} two calibration entries for {} — one per muscle group",
                        "error:".red().bold(),
                        group
                    );
                    return Ok(());
                }

                parsed.push(CalibrationEntry {
                    exercise_id: exercise.id.clone(),
                    muscle_group: group,
                    achieved: Effort::of(exercise.kind, value as u32),
                });
            }

            for group in MuscleGroup::ALL {
                if !parsed.iter().any(|e| e.muscle_group == group) {
                    println!(
                        "{} no calibration entry for {} — pick one from `tonus ex list --muscle {}`",
                        "error:".red().bold(),
                        group,
                        group
                    );
                    return Ok(());
                }
            }

            let mut profile = store::load_profile(pool)
                .await?
                .unwrap_or_else(|| UserProfile::new(Utc::now()));

            let data = CalibrationData {
                calibration_date: Utc::now(),
                exercises: parsed,
            };
            profile.strength = strength::strength_from_calibration(catalog, &data);
            profile.calibration = Some(data);
            profile.calibration_completed = true;

            store::save_profile(pool, &profile).await?;

            println!("{} calibration saved", "ok:".green().bold());
            print_levels(&profile.strength);

            Ok(())
        }

        ProfileCmd::Show => {
            let Some(profile) = store::load_profile(pool).await? else {
                println!(
                    "{} no profile — run `tonus profile init`",
                    "error:".red().bold()
                );
                return Ok(());
            };

            emit(fmt, &profile, || {
                println!("{}", "Profile:".cyan().bold());
                println!(
                    "  created {}  calibrated: {}  elastic bands: {}",
                    profile.created_date.format("%Y-%m-%d"),
                    if profile.calibration_completed { "yes" } else { "no" },
                    if profile.has_elastic_bands { "yes" } else { "no" }
                );
                print_levels(&profile.strength);
            })
        }

        ProfileCmd::Equipment { elastic_bands } => {
            let Some(mut profile) = store::load_profile(pool).await? else {
                println!(
                    "{} no profile — run `tonus profile init`",
                    "error:".red().bold()
                );
                return Ok(());
            };

            profile.has_elastic_bands = elastic_bands;
            store::save_profile(pool, &profile).await?;

            println!(
                "{} elastic bands {}",
                "ok:".green().bold(),
                if elastic_bands { "available" } else { "unavailable" }
            );

            Ok(())
        }

        ProfileCmd::Reset { yes } => {
            if !yes {
                println!(
                    "{} this deletes the profile, the current workout and all history — re-run with --yes",
                    "warning:".yellow().bold()
                );
                return Ok(());
            }

            store::clear_all(pool).await?;
            println!("{} all data cleared", "ok:".green().bold());

            Ok(())
        }
    }
}

fn print_levels(strength: &StrengthLevels) {
    println!("{}", "Strength:".cyan().bold());
    for group in MuscleGroup::ALL {
        println!("  {:<11} {:>3} / 100", group.to_string(), strength.get(group));
    }
    println!(
        "  {}",
        format!("updated {}", strength.last_updated.format("%Y-%m-%d %H:%M")).dimmed()
    );
}
