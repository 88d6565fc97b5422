use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Get message.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid, mid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    let message = guard::owned_message(&pg_pool, uid, cid, mid).await?;

    Ok(JsonResponse::build().set_item(message).ok())
}

#[tracing::instrument(name = "List messages.", skip(user, pool_manager))]
pub async fn list(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::owned_conversation(&pg_pool, uid, cid).await?;

    let messages = db::message::fetch_by_conversation(&pg_pool, cid).await?;
    Ok(JsonResponse::build().set_list(messages).ok())
}
