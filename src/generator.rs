use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{Catalog, Exercise};
use crate::models::{Set, StrengthLevels, Workout, WorkoutExercise, WorkoutHistoryEntry, WorkoutStatus};
use crate::progression;
use crate::types::{Effort, Equipment, MuscleGroup};

/// Generation cannot proceed without at least one equipment-eligible
/// candidate per required muscle group. Distinct from missing-profile
/// state, which the caller checks before ever invoking the generator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no eligible exercises for {group}")]
    EmptyPool { group: MuscleGroup },
}

pub struct GenerateOptions<'a> {
    pub workout_number: i64,
    pub strength: &'a StrengthLevels,
    /// Exercise ids used by the last two workouts, excluded for variety.
    pub recent_exercise_ids: &'a HashSet<String>,
    /// Newest first.
    pub history: &'a [WorkoutHistoryEntry],
    pub has_elastic_bands: bool,
}

/// De-duplicated union of exercise ids across the given workouts (the
/// caller passes the last two).
pub fn recent_exercise_ids(recent: &[Workout]) -> HashSet<String> {
    recent
        .iter()
        .flat_map(|w| w.exercises.iter().map(|ex| ex.exercise_id.clone()))
        .collect()
}

/// Apply progressively relaxed keep-predicates until one leaves candidates.
/// The relaxation order is the variety policy; keeping it as an explicit
/// tier list makes it checkable independent of the random draw.
fn relax<'a>(pool: &[&'a Exercise], tiers: &[&dyn Fn(&Exercise) -> bool]) -> Vec<&'a Exercise> {
    for keep in tiers {
        let kept: Vec<&'a Exercise> = pool.iter().copied().filter(|ex| keep(ex)).collect();
        if !kept.is_empty() {
            return kept;
        }
    }

    Vec::new()
}

/// Assemble a new workout: one exercise per muscle group (sometimes a
/// bonus fourth), targets from the user's own history where it exists,
/// capacity estimates where it does not.
pub fn generate_workout<R: Rng>(
    catalog: &Catalog,
    opts: &GenerateOptions<'_>,
    rng: &mut R,
) -> Result<Workout, GenerateError> {
    let equipped = |ex: &Exercise| match ex.equipment {
        None => true,
        Some(Equipment::ElasticBand) => opts.has_elastic_bands,
    };

    let mut selected: Vec<&Exercise> = Vec::new();

    for group in MuscleGroup::ALL {
        let eligible: Vec<&Exercise> = catalog
            .by_muscle_group(group)
            .into_iter()
            .filter(|ex| equipped(ex))
            .collect();

        if eligible.is_empty() {
            return Err(GenerateError::EmptyPool { group });
        }

        let chosen: HashSet<&str> = selected.iter().map(|ex| ex.id.as_str()).collect();
        let not_recent = |ex: &Exercise| !opts.recent_exercise_ids.contains(ex.id.as_str());
        let not_chosen = |ex: &Exercise| !chosen.contains(ex.id.as_str());
        let fresh = |ex: &Exercise| not_recent(ex) && not_chosen(ex);
        let any = |_: &Exercise| true;

        let tiers: [&dyn Fn(&Exercise) -> bool; 3] = [&fresh, &not_chosen, &any];
        let pool = relax(&eligible, &tiers);

        let pick = pool[rng.gen_range(0..pool.len())];
        debug!(%group, exercise = %pick.id, pool = pool.len(), "selected");
        selected.push(pick);
    }

    // Coin flip for a bonus fourth exercise; no tier relaxation here, the
    // bonus is simply skipped when nothing fresh is available.
    if rng.gen_bool(0.5) && selected.len() == 3 {
        let group = MuscleGroup::ALL[rng.gen_range(0..MuscleGroup::ALL.len())];
        let chosen: HashSet<&str> = selected.iter().map(|ex| ex.id.as_str()).collect();

        let pool: Vec<&Exercise> = catalog
            .by_muscle_group(group)
            .into_iter()
            .filter(|ex| {
                equipped(ex)
                    && !chosen.contains(ex.id.as_str())
                    && !opts.recent_exercise_ids.contains(ex.id.as_str())
            })
            .collect();

        if !pool.is_empty() {
            let pick = pool[rng.gen_range(0..pool.len())];
            debug!(%group, exercise = %pick.id, "bonus exercise");
            selected.push(pick);
        }
    }

    let exercises: Vec<WorkoutExercise> = selected
        .iter()
        .map(|ex| build_exercise(ex, opts))
        .collect();

    let estimated_duration = estimate_duration(&exercises);

    Ok(Workout {
        id: Uuid::new_v4().to_string(),
        workout_number: opts.workout_number,
        generated_date: Utc::now(),
        started_date: None,
        completed_date: None,
        status: WorkoutStatus::Pending,
        estimated_duration,
        total_duration: None,
        exercises,
    })
}

fn build_exercise(ex: &Exercise, opts: &GenerateOptions<'_>) -> WorkoutExercise {
    let primary = ex.primary_group();
    let strength = opts.strength.get(primary);
    let heaviness = ex
        .heaviness_for(primary)
        .expect("catalog validation: primary group always has a heaviness score");

    let target = match progression::last_performance(opts.history, &ex.id) {
        Some(avg) => progression::progress(avg, ex.kind),
        None => progression::estimate_capacity(strength, heaviness, ex.kind),
    };

    // A single capacity test overstates what repeats across several sets;
    // every set gets the reduced sustainable value instead.
    let sustainable = (f64::from(target) * 0.75).round() as u32;

    let num_sets = if strength > 50 { 4 } else { 3 };
    let rest_time = (30.0 + f64::from(heaviness) / 10.0 * 30.0).round() as u32;

    WorkoutExercise {
        exercise_id: ex.id.clone(),
        exercise_name: ex.name.clone(),
        muscle_groups: ex.muscle_groups.clone(),
        sets: (1..=num_sets)
            .map(|n| Set {
                set_number: n,
                target: Effort::of(ex.kind, sustainable),
                completed: false,
                actual: None,
            })
            .collect(),
        rest_time,
    }
}

fn performance_seconds(target: Effort) -> f64 {
    match target {
        // Roughly 3 seconds per rep.
        Effort::Reps(n) => f64::from(n) * 3.0,
        Effort::Timed(secs) => f64::from(secs),
    }
}

/// Estimated total minutes: per-exercise setup, per-set setup and rest
/// (no rest after an exercise's final set), transitions between exercises,
/// and a 15% buffer for pauses and form resets.
fn estimate_duration(exercises: &[WorkoutExercise]) -> u32 {
    if exercises.is_empty() {
        return 0;
    }

    let mut total = 0.0_f64;

    for ex in exercises {
        total += 10.0;
        for set in &ex.sets {
            total += 5.0 + performance_seconds(set.target) + f64::from(ex.rest_time);
        }
        total -= f64::from(ex.rest_time);
        total += 45.0;
    }
    total -= 45.0;

    (total * 1.15 / 60.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::models::{CompletedExercise, CompletedSet, WorkoutHistoryEntry};
    use crate::types::EffortKind;

    use super::*;

    fn plain(id: &str, group: MuscleGroup, heaviness: u8, kind: EffortKind) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.to_string(),
            muscle_groups: vec![group],
            kind,
            heaviness: BTreeMap::from([(group, heaviness)]),
            equipment: None,
            default_reps: None,
            default_duration: None,
            description: None,
        }
    }

    fn banded(id: &str, group: MuscleGroup, heaviness: u8) -> Exercise {
        Exercise {
            equipment: Some(Equipment::ElasticBand),
            ..plain(id, group, heaviness, EffortKind::Reps)
        }
    }

    fn levels(score: u8) -> StrengthLevels {
        StrengthLevels {
            abs: score,
            glutes: score,
            lower_back: score,
            last_updated: Utc::now(),
        }
    }

    fn options<'a>(
        strength: &'a StrengthLevels,
        recent: &'a HashSet<String>,
        history: &'a [WorkoutHistoryEntry],
        bands: bool,
    ) -> GenerateOptions<'a> {
        GenerateOptions {
            workout_number: 1,
            strength,
            recent_exercise_ids: recent,
            history,
            has_elastic_bands: bands,
        }
    }

    fn one_per_group_catalog() -> Catalog {
        Catalog::new(vec![
            plain("ab-a", MuscleGroup::Abs, 5, EffortKind::Reps),
            plain("gl-a", MuscleGroup::Glutes, 4, EffortKind::Reps),
            plain("lb-a", MuscleGroup::LowerBack, 5, EffortKind::Timed),
        ])
        .unwrap()
    }

    #[test]
    fn required_slots_never_repeat_an_exercise() {
        let catalog = Catalog::builtin();
        let strength = levels(40);
        let recent = HashSet::new();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let workout = generate_workout(
                catalog,
                &options(&strength, &recent, &[], true),
                &mut rng,
            )
            .unwrap();

            let ids: HashSet<&str> = workout
                .exercises
                .iter()
                .map(|ex| ex.exercise_id.as_str())
                .collect();
            assert_eq!(ids.len(), workout.exercises.len(), "seed {}", seed);
            assert!(workout.exercises.len() >= 3 && workout.exercises.len() <= 4);
        }
    }

    #[test]
    fn each_required_group_is_covered() {
        let catalog = Catalog::builtin();
        let strength = levels(40);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(3);

        let workout =
            generate_workout(catalog, &options(&strength, &recent, &[], false), &mut rng).unwrap();

        for group in MuscleGroup::ALL {
            assert!(
                workout
                    .exercises
                    .iter()
                    .any(|ex| ex.muscle_groups.contains(&group)),
                "{} not covered",
                group
            );
        }
    }

    #[test]
    fn no_band_exercise_without_bands() {
        let catalog = Catalog::builtin();
        let strength = levels(40);
        let recent = HashSet::new();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let workout = generate_workout(
                catalog,
                &options(&strength, &recent, &[], false),
                &mut rng,
            )
            .unwrap();

            for ex in &workout.exercises {
                let def = catalog.get(&ex.exercise_id).unwrap();
                assert!(def.equipment.is_none(), "picked {}", ex.exercise_id);
            }
        }
    }

    #[test]
    fn recent_exercises_are_avoided_when_alternatives_exist() {
        let catalog = Catalog::new(vec![
            plain("ab-a", MuscleGroup::Abs, 5, EffortKind::Reps),
            plain("ab-b", MuscleGroup::Abs, 5, EffortKind::Reps),
            plain("gl-a", MuscleGroup::Glutes, 4, EffortKind::Reps),
            plain("lb-a", MuscleGroup::LowerBack, 5, EffortKind::Timed),
        ])
        .unwrap();
        let strength = levels(30);
        let recent: HashSet<String> = HashSet::from(["ab-a".to_string()]);

        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let workout =
                generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng)
                    .unwrap();
            let abs_pick = &workout.exercises[0];
            assert_eq!(abs_pick.exercise_id, "ab-b", "seed {}", seed);
        }
    }

    #[test]
    fn all_recent_falls_back_to_full_pool() {
        let catalog = one_per_group_catalog();
        let strength = levels(30);
        // Every candidate is recent; generation still succeeds.
        let recent: HashSet<String> =
            ["ab-a", "gl-a", "lb-a"].iter().map(|s| s.to_string()).collect();

        let mut rng = StdRng::seed_from_u64(11);
        let workout =
            generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng).unwrap();
        assert_eq!(workout.exercises.len(), 3);
    }

    #[test]
    fn empty_pool_is_a_hard_error() {
        // Glutes only has a band exercise and the user has no bands.
        let catalog = Catalog::new(vec![
            plain("ab-a", MuscleGroup::Abs, 5, EffortKind::Reps),
            banded("gl-band", MuscleGroup::Glutes, 4),
            plain("lb-a", MuscleGroup::LowerBack, 5, EffortKind::Timed),
        ])
        .unwrap();
        let strength = levels(30);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(0);

        let err = generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng)
            .unwrap_err();
        let GenerateError::EmptyPool { group } = err;
        assert_eq!(group, MuscleGroup::Glutes);
    }

    #[test]
    fn first_time_targets_use_capacity_estimate() {
        let catalog = one_per_group_catalog();
        let strength = levels(50);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(1);

        let workout =
            generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng).unwrap();

        // strength 50, heaviness 5 reps: capacity 25, sustainable 19.
        let abs = workout
            .exercises
            .iter()
            .find(|ex| ex.exercise_id == "ab-a")
            .unwrap();
        assert_eq!(abs.sets.len(), 3);
        for set in &abs.sets {
            assert_eq!(set.target, Effort::Reps(19));
            assert!(!set.completed);
            assert!(set.actual.is_none());
        }
        // rest 30 + 5/10*30 = 45.
        assert_eq!(abs.rest_time, 45);

        // strength 50, heaviness 5 timed: capacity 150, sustainable 113.
        let lb = workout
            .exercises
            .iter()
            .find(|ex| ex.exercise_id == "lb-a")
            .unwrap();
        assert_eq!(lb.sets[0].target, Effort::Timed(113));
    }

    fn history_with(id: &str, group: MuscleGroup, reps: u32) -> Vec<WorkoutHistoryEntry> {
        vec![WorkoutHistoryEntry {
            id: "h1".to_string(),
            workout_id: "w1".to_string(),
            workout_number: 1,
            completed_date: Utc::now(),
            total_duration: 20,
            exercises: vec![CompletedExercise {
                exercise_id: id.to_string(),
                exercise_name: id.to_string(),
                muscle_groups: vec![group],
                completed_sets: vec![CompletedSet {
                    set_number: 1,
                    actual: Effort::Reps(reps),
                }],
            }],
        }]
    }

    #[test]
    fn repeat_exposure_uses_progression_over_history() {
        let catalog = one_per_group_catalog();
        let strength = levels(50);
        let recent = HashSet::new();
        let history = history_with("ab-a", MuscleGroup::Abs, 20);
        let mut rng = StdRng::seed_from_u64(9);

        let workout =
            generate_workout(&catalog, &options(&strength, &recent, &history, false), &mut rng)
                .unwrap();

        // progression(20) = 22, sustainable = round(16.5) = 17.
        let abs = workout
            .exercises
            .iter()
            .find(|ex| ex.exercise_id == "ab-a")
            .unwrap();
        assert_eq!(abs.sets[0].target, Effort::Reps(17));
    }

    #[test]
    fn on_target_completion_never_lowers_the_next_target() {
        let catalog = one_per_group_catalog();
        let strength = levels(40);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(21);

        let first =
            generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng).unwrap();
        let abs = first
            .exercises
            .iter()
            .find(|ex| ex.exercise_id == "ab-a")
            .unwrap();
        let performed = abs.sets[0].target.value();

        // Complete every set exactly at its prescribed value.
        let history = history_with("ab-a", MuscleGroup::Abs, performed);
        let next =
            generate_workout(&catalog, &options(&strength, &recent, &history, false), &mut rng)
                .unwrap();
        let next_abs = next
            .exercises
            .iter()
            .find(|ex| ex.exercise_id == "ab-a")
            .unwrap();

        // The raw progression target always clears the performance it grew
        // from, so prescriptions do not stagnate under on-target work.
        let next_target = progression::progress(f64::from(performed), EffortKind::Reps);
        assert!(next_target > performed);
        assert_eq!(
            next_abs.sets[0].target.value(),
            (f64::from(next_target) * 0.75).round() as u32
        );
    }

    #[test]
    fn set_count_follows_strength_level() {
        let catalog = one_per_group_catalog();
        let recent = HashSet::new();

        let weak = levels(50);
        let mut rng = StdRng::seed_from_u64(5);
        let workout =
            generate_workout(&catalog, &options(&weak, &recent, &[], false), &mut rng).unwrap();
        assert!(workout.exercises.iter().all(|ex| ex.sets.len() == 3));

        let strong = levels(51);
        let workout =
            generate_workout(&catalog, &options(&strong, &recent, &[], false), &mut rng).unwrap();
        assert!(workout.exercises.iter().all(|ex| ex.sets.len() == 4));
    }

    #[test]
    fn duration_estimate_matches_hand_computation() {
        let ex = WorkoutExercise {
            exercise_id: "x".to_string(),
            exercise_name: "x".to_string(),
            muscle_groups: vec![MuscleGroup::Abs],
            sets: (1..=3)
                .map(|n| Set {
                    set_number: n,
                    target: Effort::Reps(19),
                    completed: false,
                    actual: None,
                })
                .collect(),
            rest_time: 45,
        };

        // 10 setup + 3 * (5 + 57 + 45) - 45 trailing rest = 286 seconds;
        // 286 * 1.15 / 60 = 5.48 -> 6 minutes.
        assert_eq!(estimate_duration(&[ex]), 6);
    }

    #[test]
    fn generated_workout_starts_pending() {
        let catalog = one_per_group_catalog();
        let strength = levels(20);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(2);

        let workout =
            generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng).unwrap();
        assert_eq!(workout.status, WorkoutStatus::Pending);
        assert!(workout.started_date.is_none());
        assert!(workout.estimated_duration > 0);
    }

    #[test]
    fn recent_ids_are_the_union_of_the_given_workouts() {
        let catalog = one_per_group_catalog();
        let strength = levels(20);
        let recent = HashSet::new();
        let mut rng = StdRng::seed_from_u64(14);

        let a = generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng)
            .unwrap();
        let b = generate_workout(&catalog, &options(&strength, &recent, &[], false), &mut rng)
            .unwrap();

        let ids = recent_exercise_ids(&[a.clone(), b]);
        for ex in &a.exercises {
            assert!(ids.contains(&ex.exercise_id));
        }
        assert_eq!(ids.len(), 3);
    }
}
