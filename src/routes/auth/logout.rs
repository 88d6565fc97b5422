use crate::auth::SESSION_COOKIE;
use crate::configuration::Settings;
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde_json::json;

#[tracing::instrument(name = "Logout.", skip_all)]
pub async fn logout(settings: web::Data<Settings>) -> HttpResponse {
    let cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(settings.auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(-1))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true }))
}
