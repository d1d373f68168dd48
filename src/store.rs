use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{
    StrengthLevels, UserProfile, Workout, WorkoutExercise, WorkoutHistoryEntry, WorkoutStatus,
};

type WorkoutRow = (
    String,                    // id
    i64,                       // workout_number
    DateTime<Utc>,             // generated_date
    Option<DateTime<Utc>>,     // started_date
    Option<DateTime<Utc>>,     // completed_date
    String,                    // status
    i64,                       // estimated_duration
    Option<i64>,               // total_duration
    String,                    // exercises (JSON)
);

fn workout_from_row(row: WorkoutRow) -> Result<Workout> {
    let (id, workout_number, generated_date, started_date, completed_date, status, est, total, json) =
        row;

    let exercises: Vec<WorkoutExercise> =
        serde_json::from_str(&json).with_context(|| format!("bad exercise data in workout {}", id))?;

    Ok(Workout {
        id,
        workout_number,
        generated_date,
        started_date,
        completed_date,
        status: status.parse::<WorkoutStatus>().map_err(|e| anyhow!(e))?,
        estimated_duration: est as u32,
        total_duration: total.map(|t| t as u32),
        exercises,
    })
}

pub async fn add_workout(pool: &SqlitePool, workout: &Workout) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO workouts
          (id, workout_number, generated_date, started_date, completed_date,
           status, estimated_duration, total_duration, exercises)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&workout.id)
    .bind(workout.workout_number)
    .bind(workout.generated_date)
    .bind(workout.started_date)
    .bind(workout.completed_date)
    .bind(workout.status.to_string())
    .bind(workout.estimated_duration as i64)
    .bind(workout.total_duration.map(|t| t as i64))
    .bind(serde_json::to_string(&workout.exercises)?)
    .execute(pool)
    .await?;

    Ok(())
}

/// Whole-record replace.
pub async fn put_workout(pool: &SqlitePool, workout: &Workout) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE workouts
        SET workout_number = ?2, generated_date = ?3, started_date = ?4,
            completed_date = ?5, status = ?6, estimated_duration = ?7,
            total_duration = ?8, exercises = ?9
        WHERE id = ?1
        "#,
    )
    .bind(&workout.id)
    .bind(workout.workout_number)
    .bind(workout.generated_date)
    .bind(workout.started_date)
    .bind(workout.completed_date)
    .bind(workout.status.to_string())
    .bind(workout.estimated_duration as i64)
    .bind(workout.total_duration.map(|t| t as i64))
    .bind(serde_json::to_string(&workout.exercises)?)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_workout(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM workouts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// The single active workout: the newest pending or in-progress one.
pub async fn current_workout(pool: &SqlitePool) -> Result<Option<Workout>> {
    let row: Option<WorkoutRow> = sqlx::query_as(
        r#"
        SELECT id, workout_number, generated_date, started_date, completed_date,
               status, estimated_duration, total_duration, exercises
        FROM workouts
        WHERE status IN ('pending', 'in-progress')
        ORDER BY generated_date DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    row.map(workout_from_row).transpose()
}

/// Last `limit` workouts by generation date, newest first. Used to build
/// the recent-exercise exclusion set.
pub async fn recent_workouts(pool: &SqlitePool, limit: i64) -> Result<Vec<Workout>> {
    let rows: Vec<WorkoutRow> = sqlx::query_as(
        r#"
        SELECT id, workout_number, generated_date, started_date, completed_date,
               status, estimated_duration, total_duration, exercises
        FROM workouts
        ORDER BY generated_date DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(workout_from_row).collect()
}

pub async fn workout_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

type HistoryRow = (String, String, i64, DateTime<Utc>, i64, String);

fn history_from_row(row: HistoryRow) -> Result<WorkoutHistoryEntry> {
    let (id, workout_id, workout_number, completed_date, total_duration, json) = row;

    let exercises = serde_json::from_str(&json)
        .with_context(|| format!("bad exercise data in history entry {}", id))?;

    Ok(WorkoutHistoryEntry {
        id,
        workout_id,
        workout_number,
        completed_date,
        total_duration: total_duration as u32,
        exercises,
    })
}

pub async fn add_history(pool: &SqlitePool, entry: &WorkoutHistoryEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO history
          (id, workout_id, workout_number, completed_date, total_duration, exercises)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.workout_id)
    .bind(entry.workout_number)
    .bind(entry.completed_date)
    .bind(entry.total_duration as i64)
    .bind(serde_json::to_string(&entry.exercises)?)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace every given entry in one transaction; used after renumbering,
/// where all workout numbers shift together.
pub async fn put_history_all(pool: &SqlitePool, entries: &[WorkoutHistoryEntry]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO history
              (id, workout_id, workout_number, completed_date, total_duration, exercises)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
              workout_id = excluded.workout_id,
              workout_number = excluded.workout_number,
              completed_date = excluded.completed_date,
              total_duration = excluded.total_duration,
              exercises = excluded.exercises
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.workout_id)
        .bind(entry.workout_number)
        .bind(entry.completed_date)
        .bind(entry.total_duration as i64)
        .bind(serde_json::to_string(&entry.exercises)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

pub async fn delete_history(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM history WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn history_newest_first(pool: &SqlitePool) -> Result<Vec<WorkoutHistoryEntry>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        r#"
        SELECT id, workout_id, workout_number, completed_date, total_duration, exercises
        FROM history
        ORDER BY completed_date DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(history_from_row).collect()
}

pub async fn history_by_number(
    pool: &SqlitePool,
    number: i64,
) -> Result<Option<WorkoutHistoryEntry>> {
    let row: Option<HistoryRow> = sqlx::query_as(
        r#"
        SELECT id, workout_id, workout_number, completed_date, total_duration, exercises
        FROM history
        WHERE workout_number = ?
        LIMIT 1
        "#,
    )
    .bind(number)
    .fetch_optional(pool)
    .await?;

    row.map(history_from_row).transpose()
}

type ProfileRow = (
    DateTime<Utc>,         // created_date
    i64,                   // calibration_completed
    Option<String>,        // calibration (JSON)
    i64,                   // abs
    i64,                   // glutes
    i64,                   // lower_back
    DateTime<Utc>,         // last_updated
    i64,                   // has_elastic_bands
);

pub async fn load_profile(pool: &SqlitePool) -> Result<Option<UserProfile>> {
    let row: Option<ProfileRow> = sqlx::query_as(
        r#"
        SELECT created_date, calibration_completed, calibration,
               abs, glutes, lower_back, last_updated, has_elastic_bands
        FROM profile
        WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let Some((created, calibrated, calibration, abs, glutes, lower_back, updated, bands)) = row
    else {
        return Ok(None);
    };

    let calibration = calibration
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .context("bad calibration data in profile")?;

    Ok(Some(UserProfile {
        created_date: created,
        calibration_completed: calibrated != 0,
        calibration,
        strength: StrengthLevels {
            abs: abs as u8,
            glutes: glutes as u8,
            lower_back: lower_back as u8,
            last_updated: updated,
        },
        has_elastic_bands: bands != 0,
    }))
}

/// Whole-record replace of the single profile row.
pub async fn save_profile(pool: &SqlitePool, profile: &UserProfile) -> Result<()> {
    let calibration = profile
        .calibration
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO profile
          (id, created_date, calibration_completed, calibration,
           abs, glutes, lower_back, last_updated, has_elastic_bands)
        VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
          created_date = excluded.created_date,
          calibration_completed = excluded.calibration_completed,
          calibration = excluded.calibration,
          abs = excluded.abs,
          glutes = excluded.glutes,
          lower_back = excluded.lower_back,
          last_updated = excluded.last_updated,
          has_elastic_bands = excluded.has_elastic_bands
        "#,
    )
    .bind(profile.created_date)
    .bind(profile.calibration_completed as i64)
    .bind(calibration)
    .bind(profile.strength.abs as i64)
    .bind(profile.strength.glutes as i64)
    .bind(profile.strength.lower_back as i64)
    .bind(profile.strength.last_updated)
    .bind(profile.has_elastic_bands as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Wipe everything: profile, workouts and history, in one transaction.
pub async fn clear_all(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM workouts").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM history").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM profile").execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(())
}
