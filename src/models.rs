use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Effort, MuscleGroup};

/// Workout lifecycle. Transitions only move forward:
/// pending -> in-progress -> completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for WorkoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("unknown workout status: {}", s)),
        }
    }
}

/// A generated workout. Mutated in place as sets are logged, then archived
/// once completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub workout_number: i64,
    pub generated_date: DateTime<Utc>,
    pub started_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub status: WorkoutStatus,
    /// Minutes.
    pub estimated_duration: u32,
    /// Actual minutes, set on completion.
    pub total_duration: Option<u32>,
    pub exercises: Vec<WorkoutExercise>,
}

/// One exercise slot in a workout. Name and muscle groups are snapshots
/// taken at generation time so history survives later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub muscle_groups: Vec<MuscleGroup>,
    pub sets: Vec<Set>,
    /// Seconds between sets, shared by every set of this exercise.
    pub rest_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Set {
    /// 1-based, sequential.
    pub set_number: u32,
    pub target: Effort,
    pub completed: bool,
    pub actual: Option<Effort>,
}

/// Archived record of a completed workout. Only sets that were actually
/// performed are retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutHistoryEntry {
    pub id: String,
    pub workout_id: String,
    /// Dense 1..N position in completed-date order; reassigned whenever
    /// entries are added or edited, not a permanent identifier.
    pub workout_number: i64,
    pub completed_date: DateTime<Utc>,
    /// Actual minutes.
    pub total_duration: u32,
    pub exercises: Vec<CompletedExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub muscle_groups: Vec<MuscleGroup>,
    pub completed_sets: Vec<CompletedSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSet {
    pub set_number: u32,
    pub actual: Effort,
}

/// Per-muscle-group strength scores, 0-100. The persistent adaptive state;
/// written only through the update functions in `strength`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthLevels {
    pub abs: u8,
    pub glutes: u8,
    pub lower_back: u8,
    pub last_updated: DateTime<Utc>,
}

impl StrengthLevels {
    pub fn zeroed(now: DateTime<Utc>) -> Self {
        Self {
            abs: 0,
            glutes: 0,
            lower_back: 0,
            last_updated: now,
        }
    }

    pub fn get(&self, group: MuscleGroup) -> u8 {
        match group {
            MuscleGroup::Abs => self.abs,
            MuscleGroup::Glutes => self.glutes,
            MuscleGroup::LowerBack => self.lower_back,
        }
    }

    pub fn set(&mut self, group: MuscleGroup, score: u8) {
        match group {
            MuscleGroup::Abs => self.abs = score,
            MuscleGroup::Glutes => self.glutes = score,
            MuscleGroup::LowerBack => self.lower_back = score,
        }
    }
}

/// One-time (or reset-triggered) baseline measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationData {
    pub calibration_date: DateTime<Utc>,
    pub exercises: Vec<CalibrationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub exercise_id: String,
    pub muscle_group: MuscleGroup,
    pub achieved: Effort,
}

/// Single-record user state, replaced whole on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub created_date: DateTime<Utc>,
    pub calibration_completed: bool,
    pub calibration: Option<CalibrationData>,
    pub strength: StrengthLevels,
    pub has_elastic_bands: bool,
}

impl UserProfile {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_date: now,
            calibration_completed: false,
            calibration: None,
            strength: StrengthLevels::zeroed(now),
            has_elastic_bands: false,
        }
    }
}
