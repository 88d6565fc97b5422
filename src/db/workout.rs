use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use crate::validators;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn insert(pool: &PgPool, workout: models::Workout) -> Result<models::Workout, StoreError> {
    validators::workout(&workout)?;

    let query_span = tracing::info_span!("Saving new workout into the database");
    sqlx::query_as::<_, models::Workout>(
        r#"
        INSERT INTO workouts (user_id, created_at, updated_at)
        VALUES ($1, NOW(), NOW())
        RETURNING id, user_id, created_at, updated_at
        "#,
    )
    .bind(workout.user_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("insert workout", err))
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<models::Workout, StoreError> {
    validators::positive_id("workout id", id)?;

    sqlx::query_as::<_, models::Workout>(
        "SELECT id, user_id, created_at, updated_at FROM workouts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Fetch workout."))
    .await
    .map_err(|err| log_failure("fetch workout", err))?
    .ok_or(StoreError::NotFound("workout"))
}

/// Workouts of a user, newest first, optionally narrowed to a calendar period.
pub async fn list(
    pool: &PgPool,
    user_id: i64,
    filter: &models::WorkoutFilter,
) -> Result<Vec<models::Workout>, StoreError> {
    validators::positive_id("user id", user_id)?;
    let range = filter.range()?;

    let query_span = tracing::info_span!("Fetch workouts by user id.", user_id, ?filter);
    let query = match range {
        Some((start, end)) => sqlx::query_as::<_, models::Workout>(
            r#"
            SELECT id, user_id, created_at, updated_at FROM workouts
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end),
        None => sqlx::query_as::<_, models::Workout>(
            r#"
            SELECT id, user_id, created_at, updated_at FROM workouts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id),
    };

    query
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map_err(|err| log_failure("list workouts", err))
}

/// Bumps `updated_at`, the only mutable attribute of a workout.
pub async fn touch(pool: &PgPool, id: i64) -> Result<models::Workout, StoreError> {
    validators::positive_id("workout id", id)?;

    sqlx::query_as::<_, models::Workout>(
        r#"
        UPDATE workouts SET updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Updating workout"))
    .await
    .map_err(|err| log_failure("update workout", err))?
    .ok_or(StoreError::NotFound("workout"))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<models::Workout, StoreError> {
    validators::positive_id("workout id", id)?;

    sqlx::query_as::<_, models::Workout>(
        "DELETE FROM workouts WHERE id = $1 RETURNING id, user_id, created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Delete workout."))
    .await
    .map_err(|err| log_failure("delete workout", err))?
    .ok_or(StoreError::NotFound("workout"))
}
