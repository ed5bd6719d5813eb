//! Logging middleware
//!
//! Logs each request as it starts, then once more when it finishes with
//! status, latency and, when the authorization gate resolved one, the
//! caller's user id.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use crypto_core::jwt::Identity;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

/// Middleware that logs HTTP requests and responses
#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        tracing::info!(
            method = %method,
            path = %path,
            "HTTP request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(res) => {
                    let user_id = res
                        .request()
                        .extensions()
                        .get::<Identity>()
                        .map(|identity| identity.id.to_string())
                        .unwrap_or_else(|| "-".to_string());

                    tracing::info!(
                        method = %method,
                        path = %path,
                        status = res.status().as_u16(),
                        user_id = %user_id,
                        duration_ms,
                        "HTTP request completed"
                    );
                }
                Err(err) => {
                    tracing::info!(
                        method = %method,
                        path = %path,
                        status = err.as_response_error().status_code().as_u16(),
                        duration_ms,
                        "HTTP request rejected"
                    );
                }
            }

            result
        })
    }
}
