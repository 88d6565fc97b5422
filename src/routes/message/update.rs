use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "Update message.", skip(user, form, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64, i64)>,
    form: web::Json<forms::MessageUpdateForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid, mid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    form.validate()?;

    let message = guard::owned_message(&pg_pool, uid, cid, mid).await?;
    form.check_type(message.message_type)
        .map_err(ApiError::InvalidInput)?;

    let message = db::message::update_content(&pg_pool, message.id, &form.content).await?;
    Ok(JsonResponse::build().set_item(message).ok())
}
