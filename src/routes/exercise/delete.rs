use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Delete exercise.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, wid, eid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::owned_exercise(&pg_pool, uid, wid, eid).await?;

    let exercise = db::exercise::delete(&pg_pool, eid).await?;
    JsonResponse::<models::Exercise>::build().deleted(exercise.id)
}
