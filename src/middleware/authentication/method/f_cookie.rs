use crate::auth::SESSION_COOKIE;
use crate::errors::ApiError;
use actix_web::dev::ServiceRequest;

#[tracing::instrument(name = "Authenticate with cookie", skip(req))]
pub fn try_cookie(req: &ServiceRequest) -> Result<bool, ApiError> {
    let cookie = match req.cookie(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => cookie,
        _ => return Ok(false),
    };

    super::authenticate(req, cookie.value())?;
    Ok(true)
}
