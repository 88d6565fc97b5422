//! Ownership checks shared by the request handlers.
//!
//! The caller may only address their own user id; anything else is 403. Below the
//! user, a child that exists but belongs to another parent is reported as 404, the
//! same as one that does not exist, so ids of other users' data are not revealed.

use crate::db;
use crate::errors::ApiError;
use crate::models;
use sqlx::PgPool;

pub fn positive_id(name: &str, id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::InvalidInput(format!("{name} must be positive, got {id}")));
    }
    Ok(id)
}

/// The session user must be the user named in the path.
pub fn authorize_user(user: &models::UserContext, uid: i64) -> Result<i64, ApiError> {
    positive_id("user id", uid)?;
    if user.user_id != uid {
        return Err(ApiError::Forbidden(format!(
            "user {} cannot access resources of user {uid}",
            user.user_id
        )));
    }
    Ok(uid)
}

pub fn ensure_parent(
    entity: &'static str,
    actual_parent: i64,
    expected_parent: i64,
) -> Result<(), ApiError> {
    if actual_parent != expected_parent {
        return Err(ApiError::NotFound(format!("{entity} not found")));
    }
    Ok(())
}

pub async fn owned_workout(pool: &PgPool, uid: i64, wid: i64) -> Result<models::Workout, ApiError> {
    positive_id("workout id", wid)?;
    let workout = db::workout::fetch(pool, wid).await?;
    ensure_parent("workout", workout.user_id, uid)?;
    Ok(workout)
}

pub async fn owned_exercise(
    pool: &PgPool,
    uid: i64,
    wid: i64,
    eid: i64,
) -> Result<models::Exercise, ApiError> {
    owned_workout(pool, uid, wid).await?;
    positive_id("exercise id", eid)?;
    let exercise = db::exercise::fetch(pool, eid).await?;
    ensure_parent("exercise", exercise.workout_id, wid)?;
    Ok(exercise)
}

pub async fn owned_conversation(
    pool: &PgPool,
    uid: i64,
    cid: i64,
) -> Result<models::Conversation, ApiError> {
    positive_id("conversation id", cid)?;
    let conversation = db::conversation::fetch(pool, cid).await?;
    ensure_parent("conversation", conversation.user_id, uid)?;
    Ok(conversation)
}

pub async fn owned_message(
    pool: &PgPool,
    uid: i64,
    cid: i64,
    mid: i64,
) -> Result<models::Message, ApiError> {
    owned_conversation(pool, uid, cid).await?;
    positive_id("message id", mid)?;
    let message = db::message::fetch(pool, mid).await?;
    ensure_parent("message", message.conversation_id, cid)?;
    Ok(message)
}
