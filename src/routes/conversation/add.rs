use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;

#[tracing::instrument(name = "Add conversation.", skip(user, pool_manager))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64,)>,
    form: web::Json<forms::ConversationForm>,
    pool_manager: web::Data<PoolManager>,
) -> Result<HttpResponse, ApiError> {
    let pg_pool = pool_manager.get().await?;
    let uid = guard::authorize_user(&user, path.0)?;
    form.validate()?;

    let conversation = form.into_inner().into_conversation(uid);
    let conversation = db::conversation::insert(&pg_pool, conversation).await?;

    Ok(JsonResponse::build().set_item(conversation).created())
}
