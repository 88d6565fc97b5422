use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// Profile of the signed in user, looked up by id.
#[tracing::instrument(name = "Get user email.", skip(user, pool_manager))]
pub async fn email(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64,)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let uid = guard::authorize_user(&user, path.0)?;
    let found = db::user::fetch(&pg_pool, uid).await?;

    Ok(JsonResponse::build().set_item(found).ok())
}
