use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Add workout.", skip(user, _form, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64,)>,
    _form: web::Json<forms::WorkoutForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let uid = guard::authorize_user(&user, path.0)?;

    let workout = models::Workout {
        user_id: uid,
        ..Default::default()
    };
    let workout = db::workout::insert(&pg_pool, workout).await?;

    Ok(JsonResponse::build().set_item(workout).created())
}
