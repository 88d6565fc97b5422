use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Current user.", skip_all)]
pub async fn item(user: web::ReqData<Arc<models::UserContext>>) -> HttpResponse {
    JsonResponse::build()
        .set_item(user.into_inner().as_ref().clone())
        .ok()
}
