use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Delete workout.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, wid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::owned_workout(&pg_pool, uid, wid).await?;

    let workout = db::workout::delete(&pg_pool, wid).await?;
    tracing::info!(workout_id = workout.id, "Workout deleted");

    JsonResponse::<models::Workout>::build().deleted(workout.id)
}
