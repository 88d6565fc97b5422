mod f_bearer;
mod f_cookie;

pub use f_bearer::try_bearer;
pub use f_cookie::try_cookie;

use crate::auth::SessionSigner;
use crate::errors::ApiError;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use std::sync::Arc;

/// Verifies a session token and attaches the caller to the request.
fn authenticate(req: &ServiceRequest, token: &str) -> Result<(), ApiError> {
    let signer = req
        .app_data::<web::Data<SessionSigner>>()
        .ok_or_else(|| ApiError::Internal("session signer is not registered".to_string()))?;

    let claims = signer.verify(token)?;
    tracing::debug!(user_id = claims.user_id, "Session verified");

    if req
        .extensions_mut()
        .insert(Arc::new(claims.user_context()))
        .is_some()
    {
        return Err(ApiError::Internal("user already authenticated".to_string()));
    }

    Ok(())
}
