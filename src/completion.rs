use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{CompletedExercise, CompletedSet, Workout, WorkoutHistoryEntry};

/// Extract the sets that actually happened: marked completed and carrying a
/// non-empty actual value. Skipped or unfilled sets are dropped, not
/// recorded as zero.
pub fn completed_exercises(workout: &Workout) -> Vec<CompletedExercise> {
    workout
        .exercises
        .iter()
        .map(|ex| CompletedExercise {
            exercise_id: ex.exercise_id.clone(),
            exercise_name: ex.exercise_name.clone(),
            muscle_groups: ex.muscle_groups.clone(),
            completed_sets: ex
                .sets
                .iter()
                .filter(|set| set.completed)
                .filter_map(|set| {
                    let actual = set.actual?;
                    (actual.value() > 0).then_some(CompletedSet {
                        set_number: set.set_number,
                        actual,
                    })
                })
                .collect(),
        })
        .collect()
}

/// Whole minutes from when the workout was started (falling back to when it
/// was generated) to `completed`.
pub fn total_duration_minutes(workout: &Workout, completed: DateTime<Utc>) -> u32 {
    let start = workout.started_date.unwrap_or(workout.generated_date);
    let millis = (completed - start).num_milliseconds().max(0);

    (millis as f64 / 60_000.0).round() as u32
}

/// Archive a just-completed workout as a history entry.
pub fn build_history_entry(workout: &Workout, completed: DateTime<Utc>) -> WorkoutHistoryEntry {
    WorkoutHistoryEntry {
        id: Uuid::new_v4().to_string(),
        workout_id: workout.id.clone(),
        workout_number: workout.workout_number,
        completed_date: completed,
        total_duration: total_duration_minutes(workout, completed),
        exercises: completed_exercises(workout),
    }
}

/// Reassign workout numbers as a dense 1..N sequence over completed-date
/// order, sorting the entries in place. Runs whenever history entries are
/// added or edited; numbers are positions, not permanent identifiers.
pub fn renumber(entries: &mut [WorkoutHistoryEntry]) {
    entries.sort_by_key(|e| e.completed_date);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.workout_number = i as i64 + 1;
    }
}

/// Set numbers stay sequential after a deletion.
pub fn renumber_sets(exercise: &mut CompletedExercise) {
    for (i, set) in exercise.completed_sets.iter_mut().enumerate() {
        set.set_number = i as u32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::models::{Set, WorkoutExercise, WorkoutStatus};
    use crate::types::{Effort, MuscleGroup};

    use super::*;

    fn workout_with(exercises: Vec<WorkoutExercise>) -> Workout {
        Workout {
            id: "w1".to_string(),
            workout_number: 4,
            generated_date: Utc::now() - Duration::minutes(90),
            started_date: Some(Utc::now() - Duration::minutes(31)),
            completed_date: None,
            status: WorkoutStatus::InProgress,
            estimated_duration: 25,
            total_duration: None,
            exercises,
        }
    }

    fn exercise(id: &str, sets: Vec<Set>) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: id.to_string(),
            exercise_name: id.to_string(),
            muscle_groups: vec![MuscleGroup::Abs],
            sets,
            rest_time: 45,
        }
    }

    fn set(n: u32, completed: bool, actual: Option<Effort>) -> Set {
        Set {
            set_number: n,
            target: Effort::Reps(15),
            completed,
            actual,
        }
    }

    #[test]
    fn only_completed_sets_with_values_are_retained() {
        let workout = workout_with(vec![
            exercise("a", vec![
                set(1, true, Some(Effort::Reps(15))),
                set(2, true, Some(Effort::Reps(12))),
                set(3, false, None),
            ]),
            exercise("b", vec![
                set(1, true, Some(Effort::Reps(10))),
                // Marked done but never filled in: dropped.
                set(2, true, None),
                // Zero counts as empty, same as never filled in.
                set(3, true, Some(Effort::Reps(0))),
            ]),
        ]);

        let completed = completed_exercises(&workout);
        assert_eq!(completed[0].completed_sets.len(), 2);
        assert_eq!(completed[1].completed_sets.len(), 1);
        assert_eq!(completed[1].completed_sets[0].actual, Effort::Reps(10));
    }

    #[test]
    fn entry_keeps_exactly_the_performed_sets() {
        let workout = workout_with(vec![
            exercise("a", vec![
                set(1, true, Some(Effort::Reps(15))),
                set(2, true, Some(Effort::Reps(14))),
                set(3, true, Some(Effort::Reps(13))),
            ]),
            exercise("b", vec![
                set(1, true, Some(Effort::Reps(10))),
                set(2, true, Some(Effort::Reps(9))),
                set(3, true, Some(Effort::Reps(8))),
            ]),
        ]);

        let entry = build_history_entry(&workout, Utc::now());
        assert_eq!(entry.workout_id, "w1");
        assert_eq!(entry.workout_number, 4);
        for ex in &entry.exercises {
            assert_eq!(ex.completed_sets.len(), 3);
        }
    }

    #[test]
    fn duration_counts_from_start_not_generation() {
        let workout = workout_with(vec![]);
        let done = Utc::now();
        // Started ~31 minutes ago even though generated 90 minutes ago.
        let minutes = total_duration_minutes(&workout, done);
        assert!((30..=32).contains(&minutes), "{}", minutes);
    }

    #[test]
    fn duration_falls_back_to_generation_date() {
        let mut workout = workout_with(vec![]);
        workout.started_date = None;
        let minutes = total_duration_minutes(&workout, Utc::now());
        assert!((89..=91).contains(&minutes), "{}", minutes);
    }

    fn history_entry(id: &str, minutes_ago: i64) -> WorkoutHistoryEntry {
        WorkoutHistoryEntry {
            id: id.to_string(),
            workout_id: format!("w-{}", id),
            workout_number: 0,
            completed_date: Utc::now() - Duration::minutes(minutes_ago),
            total_duration: 20,
            exercises: vec![],
        }
    }

    #[test]
    fn renumber_is_dense_and_chronological() {
        let mut entries = vec![
            history_entry("mid", 60),
            history_entry("new", 10),
            history_entry("old", 300),
        ];

        renumber(&mut entries);

        let order: Vec<(&str, i64)> = entries
            .iter()
            .map(|e| (e.id.as_str(), e.workout_number))
            .collect();
        assert_eq!(order, vec![("old", 1), ("mid", 2), ("new", 3)]);
    }

    #[test]
    fn delete_then_readd_renumbers_without_gaps() {
        let mut entries = vec![
            history_entry("a", 400),
            history_entry("b", 200),
            history_entry("c", 100),
        ];
        renumber(&mut entries);

        // Delete the middle entry, then add an identical one back; the
        // renumber that accompanies the add restores a dense sequence.
        let readded = entries[1].clone();
        entries.remove(1);
        entries.push(readded);
        renumber(&mut entries);

        let numbers: Vec<i64> = entries.iter().map(|e| e.workout_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(entries[1].id, "b");
    }

    #[test]
    fn set_numbers_close_up_after_removal() {
        let mut ex = CompletedExercise {
            exercise_id: "a".to_string(),
            exercise_name: "a".to_string(),
            muscle_groups: vec![MuscleGroup::Abs],
            completed_sets: vec![
                CompletedSet { set_number: 1, actual: Effort::Reps(10) },
                CompletedSet { set_number: 2, actual: Effort::Reps(9) },
                CompletedSet { set_number: 3, actual: Effort::Reps(8) },
            ],
        };

        ex.completed_sets.remove(1);
        renumber_sets(&mut ex);

        let numbers: Vec<u32> = ex.completed_sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(ex.completed_sets[1].actual, Effort::Reps(8));
    }
}
