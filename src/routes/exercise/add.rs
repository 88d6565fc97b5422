use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "Add exercise.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    form: web::Json<forms::ExerciseForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, wid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    form.validate()?;
    guard::owned_workout(&pg_pool, uid, wid).await?;

    let exercise = form.into_inner().into_exercise(wid);
    let exercise = db::exercise::insert(&pg_pool, exercise).await?;

    Ok(JsonResponse::build().set_item(exercise).created())
}
