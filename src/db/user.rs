use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use crate::validators;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn insert(pool: &PgPool, user: models::User) -> Result<models::User, StoreError> {
    validators::user(&user)?;

    let query_span = tracing::info_span!("Saving new user into the database");
    sqlx::query_as::<_, models::User>(
        r#"
        INSERT INTO users (email, created_at, updated_at)
        VALUES ($1, NOW(), NOW())
        RETURNING id, email, created_at, updated_at
        "#,
    )
    .bind(&user.email)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("insert user", err))
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<models::User, StoreError> {
    validators::positive_id("user id", id)?;
    tracing::debug!("Fetch user {}", id);

    sqlx::query_as::<_, models::User>(
        "SELECT id, email, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| log_failure("fetch user", err))?
    .ok_or(StoreError::NotFound("user"))
}

pub async fn fetch_by_email(pool: &PgPool, email: &str) -> Result<Option<models::User>, StoreError> {
    validators::email(email)?;

    let query_span = tracing::info_span!("Fetch user by email.");
    sqlx::query_as::<_, models::User>(
        "SELECT id, email, created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("fetch user by email", err))
}

/// Returns the user registered under `email`, creating it on first sight.
pub async fn fetch_or_create(pool: &PgPool, email: &str) -> Result<models::User, StoreError> {
    if let Some(user) = fetch_by_email(pool, email).await? {
        return Ok(user);
    }

    let candidate = models::User {
        email: email.to_string(),
        ..Default::default()
    };
    match insert(pool, candidate).await {
        // lost a race against a concurrent first login
        Err(StoreError::Conflict(_)) => fetch_by_email(pool, email)
            .await?
            .ok_or(StoreError::NotFound("user")),
        other => other,
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<models::User>, StoreError> {
    sqlx::query_as::<_, models::User>(
        "SELECT id, email, created_at, updated_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .instrument(tracing::info_span!("List users."))
    .await
    .map_err(|err| log_failure("list users", err))
}

pub async fn update(pool: &PgPool, user: models::User) -> Result<models::User, StoreError> {
    validators::positive_id("user id", user.id)?;
    validators::user(&user)?;

    let query_span = tracing::info_span!("Updating user");
    sqlx::query_as::<_, models::User>(
        r#"
        UPDATE users SET email = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, email, created_at, updated_at
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("update user", err))?
    .ok_or(StoreError::NotFound("user"))
}

/// Deletes a user together with everything it owns.
pub async fn delete(pool: &PgPool, id: i64) -> Result<models::User, StoreError> {
    validators::positive_id("user id", id)?;

    sqlx::query_as::<_, models::User>(
        "DELETE FROM users WHERE id = $1 RETURNING id, email, created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Delete user."))
    .await
    .map_err(|err| log_failure("delete user", err))?
    .ok_or(StoreError::NotFound("user"))
}
