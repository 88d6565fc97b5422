use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use crate::validators;
use sqlx::PgPool;
use tracing::Instrument;

const COLUMNS: &str = "id, workout_id, name, type, notes, distance, duration, sets, reps, weight, created_at, updated_at";

/// Column values of the type specific measurements, in table order.
struct Measurements {
    distance: Option<f64>,
    duration: Option<i32>,
    sets: Option<i32>,
    reps: Option<i32>,
    weight: Option<f64>,
}

impl From<&models::ExerciseDetails> for Measurements {
    fn from(details: &models::ExerciseDetails) -> Self {
        match *details {
            models::ExerciseDetails::Cardio { distance, duration } => Measurements {
                distance: Some(distance),
                duration: Some(duration),
                sets: None,
                reps: None,
                weight: None,
            },
            models::ExerciseDetails::Weights { sets, reps, weight } => Measurements {
                distance: None,
                duration: None,
                sets: Some(sets),
                reps: Some(reps),
                weight: Some(weight),
            },
        }
    }
}

fn into_exercise(row: models::ExerciseRow) -> Result<models::Exercise, StoreError> {
    models::Exercise::try_from(row).map_err(|err| {
        tracing::error!("Stored exercise is inconsistent: {}", err);
        StoreError::InvalidInput(err.0)
    })
}

pub async fn insert(pool: &PgPool, exercise: models::Exercise) -> Result<models::Exercise, StoreError> {
    validators::exercise(&exercise)?;
    let values = Measurements::from(&exercise.details);

    let query_span = tracing::info_span!("Saving new exercise into the database");
    let row = sqlx::query_as::<_, models::ExerciseRow>(&format!(
        r#"
        INSERT INTO exercises (workout_id, name, type, notes, distance, duration, sets, reps, weight, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
        RETURNING {COLUMNS}
        "#
    ))
    .bind(exercise.workout_id)
    .bind(&exercise.name)
    .bind(exercise.details.kind().as_str())
    .bind(&exercise.notes)
    .bind(values.distance)
    .bind(values.duration)
    .bind(values.sets)
    .bind(values.reps)
    .bind(values.weight)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("insert exercise", err))?;

    into_exercise(row)
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<models::Exercise, StoreError> {
    validators::positive_id("exercise id", id)?;

    let row = sqlx::query_as::<_, models::ExerciseRow>(&format!(
        "SELECT {COLUMNS} FROM exercises WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Fetch exercise."))
    .await
    .map_err(|err| log_failure("fetch exercise", err))?
    .ok_or(StoreError::NotFound("exercise"))?;

    into_exercise(row)
}

pub async fn fetch_by_workout(pool: &PgPool, workout_id: i64) -> Result<Vec<models::Exercise>, StoreError> {
    validators::positive_id("workout id", workout_id)?;

    let query_span = tracing::info_span!("Fetch exercises by workout id.", workout_id);
    sqlx::query_as::<_, models::ExerciseRow>(&format!(
        "SELECT {COLUMNS} FROM exercises WHERE workout_id = $1 ORDER BY id"
    ))
    .bind(workout_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("list exercises", err))?
    .into_iter()
    .map(into_exercise)
    .collect()
}

/// Rewrites name, notes and measurements. The type column is never changed.
pub async fn update(pool: &PgPool, exercise: models::Exercise) -> Result<models::Exercise, StoreError> {
    validators::positive_id("exercise id", exercise.id)?;
    validators::exercise(&exercise)?;
    let values = Measurements::from(&exercise.details);

    let query_span = tracing::info_span!("Updating exercise");
    let row = sqlx::query_as::<_, models::ExerciseRow>(&format!(
        r#"
        UPDATE exercises
        SET name = $3, notes = $4, distance = $5, duration = $6, sets = $7, reps = $8, weight = $9,
            updated_at = NOW()
        WHERE id = $1 AND type = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(exercise.id)
    .bind(exercise.details.kind().as_str())
    .bind(&exercise.name)
    .bind(&exercise.notes)
    .bind(values.distance)
    .bind(values.duration)
    .bind(values.sets)
    .bind(values.reps)
    .bind(values.weight)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("update exercise", err))?
    .ok_or(StoreError::NotFound("exercise"))?;

    into_exercise(row)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<models::Exercise, StoreError> {
    validators::positive_id("exercise id", id)?;

    let row = sqlx::query_as::<_, models::ExerciseRow>(&format!(
        "DELETE FROM exercises WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Delete exercise."))
    .await
    .map_err(|err| log_failure("delete exercise", err))?
    .ok_or(StoreError::NotFound("exercise"))?;

    into_exercise(row)
}
