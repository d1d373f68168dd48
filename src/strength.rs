use chrono::Utc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::models::{CalibrationData, CompletedExercise, StrengthLevels};
use crate::types::{Effort, EffortKind};

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

/// Derive initial strength levels from calibration results.
///
/// The achieved amount is normalized by the exercise's heaviness so scores
/// are comparable across exercises of different hardness; the 6x divisor
/// puts timed holds on roughly the same numeric scale as reps. Muscle groups
/// without a usable calibration entry stay at 0.
pub fn strength_from_calibration(catalog: &Catalog, data: &CalibrationData) -> StrengthLevels {
    let mut levels = StrengthLevels::zeroed(Utc::now());

    for entry in &data.exercises {
        let Some(exercise) = catalog.get(&entry.exercise_id) else {
            continue;
        };
        let Some(heaviness) = exercise.heaviness_for(entry.muscle_group) else {
            continue;
        };

        let raw = match entry.achieved {
            Effort::Reps(reps) if exercise.kind == EffortKind::Reps => {
                f64::from(reps) / f64::from(heaviness) * 10.0
            }
            Effort::Timed(secs) if exercise.kind == EffortKind::Timed => {
                (f64::from(secs) / f64::from(heaviness)) / 6.0
            }
            // Achievement kind does not match the exercise; ignore the entry.
            _ => continue,
        };

        levels.set(entry.muscle_group, clamp_score(raw));
    }

    levels
}

/// Fold completed-workout performance back into the strength levels.
///
/// The single update API: completion, history edits, and manual entries all
/// route through here. Each call stacks its increase on the given base, so
/// callers invoke it exactly once per completed or edited workout.
pub fn apply_workout(
    catalog: &Catalog,
    current: &StrengthLevels,
    completed: &[CompletedExercise],
) -> StrengthLevels {
    let mut updated = current.clone();
    updated.last_updated = Utc::now();

    for ex in completed {
        let Some(def) = catalog.get(&ex.exercise_id) else {
            // Catalog edits after the workout was recorded: skip silently.
            continue;
        };

        let total_sets = ex.completed_sets.len();
        if total_sets == 0 {
            continue;
        }

        let total: u32 = ex
            .completed_sets
            .iter()
            .map(|set| {
                if set.actual.kind() == def.kind {
                    set.actual.value()
                } else {
                    0
                }
            })
            .sum();
        let avg = f64::from(total) / total_sets as f64;

        for group in &ex.muscle_groups {
            let Some(heaviness) = def.heaviness_for(*group) else {
                continue;
            };

            let increase = match def.kind {
                EffortKind::Reps => avg / f64::from(heaviness) * 0.5,
                EffortKind::Timed => avg / f64::from(heaviness) / 12.0,
            };

            let old = updated.get(*group);
            let new = clamp_score(f64::from(old) + increase);
            debug!(exercise = %ex.exercise_id, %group, old, new, "strength update");
            updated.set(*group, new);
        }
    }

    updated
}
