use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{EffortKind, Equipment, MuscleGroup};

/// An immutable exercise definition from the built-in catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Ordered; the first entry is the primary group.
    pub muscle_groups: Vec<MuscleGroup>,
    #[serde(rename = "type")]
    pub kind: EffortKind,
    /// Difficulty 1-10, one entry per targeted muscle group.
    pub heaviness: BTreeMap<MuscleGroup, u8>,
    pub equipment: Option<Equipment>,
    pub default_reps: Option<u32>,
    pub default_duration: Option<u32>,
    pub description: Option<String>,
}

impl Exercise {
    pub fn primary_group(&self) -> MuscleGroup {
        self.muscle_groups[0]
    }

    pub fn heaviness_for(&self, group: MuscleGroup) -> Option<u8> {
        self.heaviness.get(&group).copied()
    }

    pub fn targets(&self, group: MuscleGroup) -> bool {
        self.muscle_groups.contains(&group)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    exercise: Vec<Exercise>,
}

/// Read-only lookup over the fixed exercise collection.
pub struct Catalog {
    exercises: Vec<Exercise>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    Catalog::parse(include_str!("../data/catalog.toml"))
        .expect("built-in catalog must parse and validate")
});

impl Catalog {
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Validates the catalog invariants: unique ids, at least one muscle
    /// group per exercise, heaviness 1-10 for every targeted group.
    pub fn new(exercises: Vec<Exercise>) -> Result<Self> {
        let mut seen = HashSet::new();
        for ex in &exercises {
            if !seen.insert(ex.id.as_str()) {
                bail!("duplicate exercise id `{}`", ex.id);
            }
            if ex.muscle_groups.is_empty() {
                bail!("exercise `{}` targets no muscle group", ex.id);
            }
            for group in &ex.muscle_groups {
                match ex.heaviness_for(*group) {
                    Some(h) if (1..=10).contains(&h) => {}
                    Some(h) => bail!(
                        "exercise `{}` has heaviness {} for {} (must be 1-10)",
                        ex.id,
                        h,
                        group
                    ),
                    None => bail!("exercise `{}` has no heaviness for {}", ex.id, group),
                }
            }
        }

        Ok(Self { exercises })
    }

    fn parse(toml_str: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(toml_str).context("failed to parse exercise catalog")?;

        Self::new(file.exercise)
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|ex| ex.id == id)
    }

    pub fn by_muscle_group(&self, group: MuscleGroup) -> Vec<&Exercise> {
        self.exercises.iter().filter(|ex| ex.targets(group)).collect()
    }

    pub fn by_muscle_groups(&self, groups: &[MuscleGroup]) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|ex| groups.iter().any(|g| ex.targets(*g)))
            .collect()
    }

    /// Uniform random pick from a muscle group, skipping excluded ids.
    pub fn random<R: Rng>(
        &self,
        group: MuscleGroup,
        exclude: &[&str],
        rng: &mut R,
    ) -> Option<&Exercise> {
        let pool: Vec<&Exercise> = self
            .by_muscle_group(group)
            .into_iter()
            .filter(|ex| !exclude.contains(&ex.id.as_str()))
            .collect();

        if pool.is_empty() {
            return None;
        }

        Some(pool[rng.gen_range(0..pool.len())])
    }
}
