use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub type DB = SqlitePool;

pub async fn open(path: &str) -> Result<DB> {
    let opts = SqliteConnectOptions::from_str(path)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Idempotent schema setup, run on every open.
pub async fn init_schema(pool: &DB) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workouts (
            id                 TEXT PRIMARY KEY,
            workout_number     INTEGER NOT NULL,
            generated_date     TEXT NOT NULL,
            started_date       TEXT,
            completed_date     TEXT,
            status             TEXT NOT NULL,
            estimated_duration INTEGER NOT NULL,
            total_duration     INTEGER,
            exercises          TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history (
            id             TEXT PRIMARY KEY,
            workout_id     TEXT NOT NULL,
            workout_number INTEGER NOT NULL,
            completed_date TEXT NOT NULL,
            total_duration INTEGER NOT NULL,
            exercises      TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profile (
            id                    INTEGER PRIMARY KEY CHECK (id = 1),
            created_date          TEXT NOT NULL,
            calibration_completed INTEGER NOT NULL DEFAULT 0,
            calibration           TEXT,
            abs                   INTEGER NOT NULL DEFAULT 0,
            glutes                INTEGER NOT NULL DEFAULT 0,
            lower_back            INTEGER NOT NULL DEFAULT 0,
            last_updated          TEXT NOT NULL,
            has_elastic_bands     INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
