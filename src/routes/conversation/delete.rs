use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Deletes a conversation with all of its messages and echoes the deleted record.
#[tracing::instrument(name = "Delete conversation.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::owned_conversation(&pg_pool, uid, cid).await?;

    let conversation = db::conversation::delete(&pg_pool, cid).await?;
    tracing::info!(conversation_id = conversation.id, "Conversation deleted");

    let id = conversation.id;
    JsonResponse::build().set_item(conversation).deleted(id)
}
