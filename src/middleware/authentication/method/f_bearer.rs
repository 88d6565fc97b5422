use crate::auth::extract_bearer_token;
use crate::errors::ApiError;
use actix_web::{dev::ServiceRequest, http::header};

#[tracing::instrument(name = "Authenticate with bearer token", skip(req))]
pub fn try_bearer(req: &ServiceRequest) -> Result<bool, ApiError> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| {
            ApiError::Unauthorized("authorization header is not valid text".to_string())
        })?,
        None => return Ok(false),
    };

    let token = extract_bearer_token(authorization).ok_or_else(|| {
        ApiError::Unauthorized("authorization header is not a bearer token".to_string())
    })?;

    super::authenticate(req, token)?;
    Ok(true)
}
