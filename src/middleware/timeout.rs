use crate::errors::ApiError;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Duration;

/// Fails requests that take longer than `duration` with a 504. Work spawned off the
/// request, like assistant replies, is not covered.
pub struct RequestTimeout {
    duration: Duration,
}

impl RequestTimeout {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware {
            service: Rc::new(service),
            duration: self.duration,
        }))
    }
}

pub struct RequestTimeoutMiddleware<S> {
    service: Rc<S>,
    duration: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let duration = self.duration;
        let path = req.path().to_string();
        let fut = self.service.call(req);

        async move {
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(%path, timeout_secs = duration.as_secs(), "Request timed out");
                    Err(ApiError::Timeout.into())
                }
            }
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn slow() -> HttpResponse {
        tokio::time::sleep(Duration::from_millis(300)).await;
        HttpResponse::Ok().finish()
    }

    async fn fast() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn slow_request_gets_gateway_timeout() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_millis(50)))
                .route("/slow", web::get().to(slow))
                .route("/fast", web::get().to(fast)),
        )
        .await;

        let err = app
            .call(test::TestRequest::get().uri("/slow").to_request())
            .await
            .err()
            .expect("slow request should time out");
        assert_eq!(err.as_response_error().status_code().as_u16(), 504);

        let fast = test::call_service(&app, test::TestRequest::get().uri("/fast").to_request()).await;
        assert_eq!(fast.status().as_u16(), 200);
    }
}
