use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The three muscle groups every workout covers. Closed set: exercises and
/// strength scores are both indexed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MuscleGroup {
    Abs,
    Glutes,
    LowerBack,
}

impl MuscleGroup {
    /// Generation order: abs, glutes, lower back.
    pub const ALL: [MuscleGroup; 3] = [
        MuscleGroup::Abs,
        MuscleGroup::Glutes,
        MuscleGroup::LowerBack,
    ];
}

impl Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Abs => "abs",
            Self::Glutes => "glutes",
            Self::LowerBack => "lower-back",
        };

        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Equipment {
    ElasticBand,
}

impl Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElasticBand => write!(f, "elastic-band"),
        }
    }
}

/// How an exercise is measured: counted repetitions or a timed hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffortKind {
    Reps,
    Timed,
}

/// A measured amount of work. Tagged so a set can never carry both a rep
/// count and a duration, or neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Effort {
    Reps(u32),
    /// Seconds.
    Timed(u32),
}

impl Effort {
    pub fn of(kind: EffortKind, value: u32) -> Self {
        match kind {
            EffortKind::Reps => Self::Reps(value),
            EffortKind::Timed => Self::Timed(value),
        }
    }

    pub fn kind(&self) -> EffortKind {
        match self {
            Self::Reps(_) => EffortKind::Reps,
            Self::Timed(_) => EffortKind::Timed,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            Self::Reps(v) | Self::Timed(v) => *v,
        }
    }
}

impl Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reps(v) => write!(f, "{} reps", v),
            Self::Timed(v) => write!(f, "{}s", v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Print `value` as pretty JSON, or run the plain-text fallback.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Text => text(),
    }

    Ok(())
}
