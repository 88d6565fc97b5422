use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Get conversation.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    let conversation = guard::owned_conversation(&pg_pool, uid, cid).await?;

    Ok(JsonResponse::build().set_item(conversation).ok())
}

#[tracing::instrument(name = "List conversations.", skip(user, pool_manager))]
pub async fn list(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64,)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let uid = guard::authorize_user(&user, path.0)?;
    let conversations = db::conversation::fetch_by_user(&pg_pool, uid).await?;

    Ok(JsonResponse::build().set_list(conversations).ok())
}
