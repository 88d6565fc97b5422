use super::method;
use crate::errors::ApiError;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    Error,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use std::cell::RefCell;
use std::rc::Rc;

pub struct ManagerMiddleware<S> {
    pub service: Rc<RefCell<S>>,
}

impl<S, B> Service<ServiceRequest> for ManagerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = S::Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Ok(service) = self.service.try_borrow() {
            service.poll_ready(ctx)
        } else {
            Poll::Pending
        }
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        async move {
            let authenticated = method::try_cookie(&req)? || method::try_bearer(&req)?;
            if !authenticated {
                return Err(ApiError::Unauthorized("no session credentials".to_string()));
            }

            Ok(req)
        }
        .then(|req: Result<ServiceRequest, ApiError>| async move {
            match req {
                Ok(req) => {
                    let fut = service.borrow().call(req);
                    fut.await
                }
                Err(err) => Err(err.into()),
            }
        })
        .boxed_local()
    }
}
