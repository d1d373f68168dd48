use clap::{Parser, Subcommand};

use crate::types::MuscleGroup;

#[derive(Parser)]
#[command(name = "tonus", version, about = "Adaptive bodyweight training for abs, glutes and lower back")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Database file (defaults to the platform data directory).
    #[arg(global = true, long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and run workouts
    #[command(subcommand, visible_alias = "w")]
    Workout(WorkoutCmd),

    /// Completed workout history
    #[command(subcommand, visible_alias = "h")]
    History(HistoryCmd),

    /// Profile, calibration and equipment
    #[command(subcommand, visible_alias = "p")]
    Profile(ProfileCmd),

    /// Browse the exercise catalog
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum WorkoutCmd {
    /// Generate a new workout from your strength levels
    #[command(visible_alias = "g")]
    Generate,

    /// Show the current workout
    #[command(visible_alias = "s")]
    Show,

    /// Start the current workout
    Start,

    /// Log a completed set - Usage: workout log EXERCISE VALUE
    #[command(visible_alias = "l")]
    #[command(override_usage = "workout log <EXERCISE> <VALUE>")]
    Log {
        /// Exercise index (same order shown in `workout show`)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        /// Reps performed, or seconds held for timed exercises
        #[arg(value_name = "VALUE")]
        value: i64,

        /// Specific set to log (defaults to the next unlogged set)
        #[arg(long, short = 's')]
        set: Option<usize>,
    },

    /// Finish the current workout and update strength levels
    #[command(visible_alias = "c")]
    Complete,

    /// Abandon and delete the current workout
    Cancel,
}

#[derive(Subcommand)]
pub enum HistoryCmd {
    /// List completed workouts
    #[command(visible_alias = "l")]
    List,

    /// Show one completed workout in detail
    #[command(visible_alias = "s")]
    Show {
        /// Workout number (from `history list`)
        number: i64,
    },

    /// Record a workout done off the books - Usage: history add EX=V,V,...
    #[command(visible_alias = "a")]
    Add {
        /// Completion date as YYYY-MM-DD (defaults to now)
        #[arg(short, long)]
        date: Option<String>,

        /// Total duration in minutes
        #[arg(long, default_value = "30")]
        duration: u32,

        /// Performed exercises as ID=V1,V2,... (reps, or seconds when timed)
        #[arg(value_name = "EXERCISE", required = true)]
        exercises: Vec<String>,
    },

    /// Correct a set in a completed workout
    #[command(visible_alias = "e")]
    Edit {
        /// Workout number (from `history list`)
        number: i64,

        /// Exercise index within the entry
        #[arg(short, long)]
        exercise: usize,

        /// Set number to change
        #[arg(short, long)]
        set: u32,

        /// New value (reps or seconds)
        #[arg(short, long)]
        value: Option<i64>,

        /// Remove the set instead of changing it
        #[arg(long)]
        remove: bool,
    },

    /// Delete a completed workout from history
    #[command(visible_alias = "d")]
    Delete {
        /// Workout number (from `history list`)
        number: i64,

        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCmd {
    /// Create an empty profile
    Init,

    /// Record calibration results - Usage: profile calibrate EX=VALUE ...
    #[command(visible_alias = "c")]
    Calibrate {
        /// One max-effort result per muscle group as ID=VALUE
        /// (reps, or seconds when the exercise is timed)
        #[arg(value_name = "ENTRY", required = true)]
        entries: Vec<String>,
    },

    /// Show strength levels and profile state
    #[command(visible_alias = "s")]
    Show,

    /// Set equipment availability
    Equipment {
        /// Whether elastic bands are available
        #[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
        elastic_bands: bool,
    },

    /// Delete the profile and all recorded data
    Reset {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ExerciseCmd {
    /// List catalog exercises
    #[command(visible_alias = "l")]
    List {
        /// Filter by muscle group
        #[arg(short, long)]
        muscle: Option<MuscleGroup>,
    },

    /// Show detailed exercise information
    #[command(visible_alias = "s")]
    Show {
        /// Exercise id (see `ex list`)
        exercise: String,
    },
}
