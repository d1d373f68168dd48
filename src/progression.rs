use crate::models::WorkoutHistoryEntry;
use crate::types::EffortKind;

fn round_to_5(x: f64) -> f64 {
    (x / 5.0).round() * 5.0
}

/// First-time target for an exercise the user has never performed: scale the
/// muscle group's strength level by the exercise's heaviness. Floored at 5
/// reps / 10 seconds so a fresh user still gets a workable prescription.
pub fn estimate_capacity(strength: u8, heaviness: u8, kind: EffortKind) -> u32 {
    let scaled = f64::from(strength) / 10.0 * f64::from(heaviness);

    match kind {
        EffortKind::Reps => scaled.round().max(5.0) as u32,
        EffortKind::Timed => round_to_5(scaled * 6.0).max(10.0) as u32,
    }
}

/// Progressive overload: a flat 7.5% increase on the last recorded
/// performance. Never decreases and never grows by less than the minimum
/// step (+1 rep, or +5 seconds with timed targets kept on a 5-second grid).
pub fn progress(last_performance: f64, kind: EffortKind) -> u32 {
    let grown = last_performance * 1.075;

    let next = match kind {
        EffortKind::Reps => grown.round().max(last_performance + 1.0),
        EffortKind::Timed => round_to_5(grown).max(last_performance + 5.0),
    };

    next.round() as u32
}

/// Most recent average performance for an exercise, scanning `history`
/// newest-first. Entries that recorded the exercise without any completed
/// set are skipped.
pub fn last_performance(history: &[WorkoutHistoryEntry], exercise_id: &str) -> Option<f64> {
    for entry in history {
        let Some(ex) = entry
            .exercises
            .iter()
            .find(|e| e.exercise_id == exercise_id)
        else {
            continue;
        };

        if ex.completed_sets.is_empty() {
            continue;
        }

        let total: u32 = ex.completed_sets.iter().map(|s| s.actual.value()).sum();
        return Some(f64::from(total) / ex.completed_sets.len() as f64);
    }

    None
}
