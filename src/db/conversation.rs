use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use crate::validators;
use sqlx::PgPool;
use tracing::Instrument;

pub async fn insert(
    pool: &PgPool,
    conversation: models::Conversation,
) -> Result<models::Conversation, StoreError> {
    validators::conversation(&conversation)?;

    let query_span = tracing::info_span!("Saving new conversation into the database");
    sqlx::query_as::<_, models::Conversation>(
        r#"
        INSERT INTO conversations (user_id, title, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        RETURNING id, user_id, title, is_active, created_at, updated_at
        "#,
    )
    .bind(conversation.user_id)
    .bind(&conversation.title)
    .bind(conversation.is_active)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("insert conversation", err))
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<models::Conversation, StoreError> {
    validators::positive_id("conversation id", id)?;

    sqlx::query_as::<_, models::Conversation>(
        r#"
        SELECT id, user_id, title, is_active, created_at, updated_at
        FROM conversations WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Fetch conversation."))
    .await
    .map_err(|err| log_failure("fetch conversation", err))?
    .ok_or(StoreError::NotFound("conversation"))
}

/// Conversations of a user, most recently active first, each carrying its newest message.
pub async fn fetch_by_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<models::Conversation>, StoreError> {
    validators::positive_id("user id", user_id)?;

    let query_span = tracing::info_span!("Fetch conversations by user id.", user_id);
    sqlx::query_as::<_, models::Conversation>(
        r#"
        SELECT c.id, c.user_id, c.title, c.is_active, c.created_at, c.updated_at,
            (
                SELECT m.content FROM messages m
                WHERE m.conversation_id = c.id
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT 1
            ) AS last_message
        FROM conversations c
        WHERE c.user_id = $1
        ORDER BY c.updated_at DESC, c.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("list conversations", err))
}

pub async fn update(
    pool: &PgPool,
    conversation: models::Conversation,
) -> Result<models::Conversation, StoreError> {
    validators::positive_id("conversation id", conversation.id)?;
    validators::conversation(&conversation)?;

    let query_span = tracing::info_span!("Updating conversation");
    sqlx::query_as::<_, models::Conversation>(
        r#"
        UPDATE conversations SET title = $2, is_active = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, title, is_active, created_at, updated_at
        "#,
    )
    .bind(conversation.id)
    .bind(&conversation.title)
    .bind(conversation.is_active)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("update conversation", err))?
    .ok_or(StoreError::NotFound("conversation"))
}

/// Deletes a conversation and, by cascade, its messages.
pub async fn delete(pool: &PgPool, id: i64) -> Result<models::Conversation, StoreError> {
    validators::positive_id("conversation id", id)?;

    sqlx::query_as::<_, models::Conversation>(
        r#"
        DELETE FROM conversations WHERE id = $1
        RETURNING id, user_id, title, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Delete conversation."))
    .await
    .map_err(|err| log_failure("delete conversation", err))?
    .ok_or(StoreError::NotFound("conversation"))
}
