use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Get workout.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, wid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    let workout = guard::owned_workout(&pg_pool, uid, wid).await?;

    Ok(JsonResponse::build().set_item(workout).ok())
}

#[tracing::instrument(name = "List workouts.", skip(user, pool_manager))]
pub async fn list(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64,)>,
    filter: web::Query<models::WorkoutFilter>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let uid = guard::authorize_user(&user, path.0)?;
    let workouts = db::workout::list(&pg_pool, uid, &filter).await?;

    Ok(JsonResponse::build().set_list(workouts).ok())
}
