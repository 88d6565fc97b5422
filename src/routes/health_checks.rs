use crate::health::HealthChecker;
use actix_web::{web, HttpResponse};

/// Liveness: always 200 while the process serves requests, with component details.
pub async fn health_check(checker: web::Data<HealthChecker>) -> HttpResponse {
    HttpResponse::Ok().json(checker.check_all().await)
}
