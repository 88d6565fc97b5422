use crate::auth::{GoogleVerifier, SessionSigner, SESSION_COOKIE};
use crate::configuration::Settings;
use crate::db::{self, PoolManager};
use crate::errors::ApiError;
use crate::forms;
use crate::helpers::JsonResponse;
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde_valid::Validate;

/// Exchanges a Google id token for a session cookie, registering the user on first login.
#[tracing::instrument(name = "Google login.", skip_all)]
pub async fn login(
    form: web::Json<forms::GoogleLogin>,
    pool_manager: web::Data<PoolManager>,
    verifier: web::Data<GoogleVerifier>,
    signer: web::Data<SessionSigner>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, ApiError> {
    form.validate()?;
    let google = verifier.verify(&form.google_token).await?;

    let pg_pool = pool_manager.get().await?;
    let now = chrono::Utc::now().timestamp();
    let user = db::user::fetch_or_create(&pg_pool, &google.email).await?;
    let token = signer.sign(&signer.claims_for(&user, &google, now))?;
    tracing::info!(user_id = user.id, "User signed in");

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(settings.auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(signer.ttl_secs()))
        .finish();

    let mut response = JsonResponse::build().set_item(user).ok();
    response
        .add_cookie(&cookie)
        .map_err(|err| ApiError::Internal(format!("set session cookie: {err}")))?;
    Ok(response)
}
