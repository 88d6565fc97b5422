use crate::db::error::log_failure;
use crate::db::StoreError;
use crate::models;
use crate::validators;
use sqlx::PgPool;
use tracing::Instrument;

const COLUMNS: &str = "id, conversation_id, user_id, content, message_type, created_at, updated_at";

/// Stores a message as is. Ownership of the conversation is not checked here;
/// request paths go through [`insert_in_conversation`].
pub async fn insert(pool: &PgPool, message: models::Message) -> Result<models::Message, StoreError> {
    validators::message(&message)?;

    let query_span = tracing::info_span!("Saving new message into the database");
    sqlx::query_as::<_, models::Message>(&format!(
        r#"
        INSERT INTO messages (conversation_id, user_id, content, message_type, created_at, updated_at)
        VALUES ($1, $2, $3, $4, clock_timestamp(), clock_timestamp())
        RETURNING {COLUMNS}
        "#
    ))
    .bind(message.conversation_id)
    .bind(message.user_id)
    .bind(&message.content)
    .bind(message.message_type.as_str())
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("insert message", err))
}

/// Appends a message to a conversation owned by `message.user_id`.
///
/// Runs in one transaction: the conversation's `updated_at` is bumped first, which
/// row-locks it, so appends to the same conversation are serialized and `created_at`
/// order matches id order. A conversation that is missing or owned by someone else is
/// reported as `NotFound`.
pub async fn insert_in_conversation(
    pool: &PgPool,
    message: models::Message,
) -> Result<models::Message, StoreError> {
    validators::message(&message)?;

    let query_span = tracing::info_span!(
        "Appending message to conversation",
        conversation_id = message.conversation_id,
        message_type = %message.message_type
    );

    async move {
        let mut tx = pool
            .begin()
            .await
            .map_err(|err| log_failure("begin message transaction", err))?;

        let owner: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE conversations SET updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING user_id
            "#,
        )
        .bind(message.conversation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| log_failure("touch conversation", err))?;

        if owner != Some(message.user_id) {
            tx.rollback()
                .await
                .map_err(|err| log_failure("roll back message transaction", err))?;
            return Err(StoreError::NotFound("conversation"));
        }

        let stored = sqlx::query_as::<_, models::Message>(&format!(
            r#"
            INSERT INTO messages (conversation_id, user_id, content, message_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, clock_timestamp(), clock_timestamp())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(message.conversation_id)
        .bind(message.user_id)
        .bind(&message.content)
        .bind(message.message_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| log_failure("insert message", err))?;

        tx.commit()
            .await
            .map_err(|err| log_failure("commit message transaction", err))?;

        Ok::<_, StoreError>(stored)
    }
    .instrument(query_span)
    .await
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<models::Message, StoreError> {
    validators::positive_id("message id", id)?;

    sqlx::query_as::<_, models::Message>(&format!("SELECT {COLUMNS} FROM messages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .instrument(tracing::info_span!("Fetch message."))
        .await
        .map_err(|err| log_failure("fetch message", err))?
        .ok_or(StoreError::NotFound("message"))
}

/// Messages of a conversation in the order they were written.
pub async fn fetch_by_conversation(
    pool: &PgPool,
    conversation_id: i64,
) -> Result<Vec<models::Message>, StoreError> {
    validators::positive_id("conversation id", conversation_id)?;

    let query_span = tracing::info_span!("Fetch messages by conversation id.", conversation_id);
    sqlx::query_as::<_, models::Message>(&format!(
        "SELECT {COLUMNS} FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(conversation_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| log_failure("list messages", err))
}

/// Replaces the content of a message. Author, conversation and type never change.
pub async fn update_content(
    pool: &PgPool,
    id: i64,
    content: &str,
) -> Result<models::Message, StoreError> {
    validators::positive_id("message id", id)?;
    validators::not_blank("content", content)?;

    sqlx::query_as::<_, models::Message>(&format!(
        r#"
        UPDATE messages SET content = $2, updated_at = clock_timestamp()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(content)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Updating message"))
    .await
    .map_err(|err| log_failure("update message", err))?
    .ok_or(StoreError::NotFound("message"))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<models::Message, StoreError> {
    validators::positive_id("message id", id)?;

    sqlx::query_as::<_, models::Message>(&format!(
        "DELETE FROM messages WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .instrument(tracing::info_span!("Delete message."))
    .await
    .map_err(|err| log_failure("delete message", err))?
    .ok_or(StoreError::NotFound("message"))
}
