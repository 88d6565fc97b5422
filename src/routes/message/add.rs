use crate::errors::ApiError;
use crate::forms;
use crate::guard;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::MessagePipeline;
use actix_web::{web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;
use tracing_actix_web::RequestId;

/// Stores the message and answers right away; the assistant reply, if any, shows up
/// in the message list later.
#[tracing::instrument(name = "Add message.", skip(user, form, pipeline, request_id))]
pub async fn item(
    user: web::ReqData<Arc<models::UserContext>>,
    path: web::Path<(i64, i64)>,
    form: web::Json<forms::MessageForm>,
    pipeline: web::Data<MessagePipeline>,
    request_id: RequestId,
) -> Result<HttpResponse, ApiError> {
    let (uid, cid) = path.into_inner();
    let uid = guard::authorize_user(&user, uid)?;
    guard::positive_id("conversation id", cid)?;
    form.validate()?;

    let submission = pipeline
        .submit(uid, cid, form.into_inner(), request_id.to_string())
        .await?;

    Ok(JsonResponse::build().set_item(submission.message).created())
}
