use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

/// A workout only carries timestamps, so an update just marks it as modified.
#[tracing::instrument(name = "Update workout.", skip(user, _form, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    _form: web::Json<forms::WorkoutForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, wid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::owned_workout(&pg_pool, uid, wid).await?;

    let workout = db::workout::touch(&pg_pool, wid).await?;
    Ok(JsonResponse::build().set_item(workout).ok())
}
