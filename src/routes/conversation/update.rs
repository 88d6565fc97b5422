use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "Update conversation.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    form: web::Json<forms::ConversationUpdateForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let (uid, cid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    form.validate()?;

    let mut conversation = guard::owned_conversation(&pg_pool, uid, cid).await?;
    form.into_inner().update(&mut conversation);

    let conversation = db::conversation::update(&pg_pool, conversation).await?;
    Ok(JsonResponse::build().set_item(conversation).ok())
}
