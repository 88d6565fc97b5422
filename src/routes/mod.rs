pub mod auth;
pub mod conversation;
pub mod exercise;
mod health_checks;
pub mod message;
pub mod user;
pub mod workout;

pub use health_checks::*;

use crate::errors::ApiError;
use actix_web::HttpResponse;

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("no route".to_string()))
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}
