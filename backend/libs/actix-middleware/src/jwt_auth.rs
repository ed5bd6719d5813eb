//! Authorization gate
//!
//! Every request with a mutating method must carry a valid signed token in
//! the designated header. Rejected requests never reach downstream services;
//! accepted ones carry the resolved [`Identity`] in their extensions.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderName, Method, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use crypto_core::jwt::{AuthError, Identity, TokenVerifier};
use futures::future::LocalBoxFuture;
use std::fmt;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Header carrying the signed token unless configured otherwise
pub const DEFAULT_TOKEN_HEADER: &str = "x-auth-token";

/// 401 rejection rendered as `{"msg": "..."}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejection(pub AuthError);

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "msg": self.0.to_string(),
        }))
    }
}

fn requires_identity(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Gate that authenticates every mutating request.
#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<TokenVerifier>,
    header: HeaderName,
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            header: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
        }
    }

    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthorizationGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizationGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationGateService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            header: self.header.clone(),
        }))
    }
}

pub struct AuthorizationGateService<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
    header: HeaderName,
}

impl<S, B> Service<ServiceRequest> for AuthorizationGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if !requires_identity(req.method()) {
            return Box::pin(async move { service.call(req).await });
        }

        let verified = req
            .headers()
            .get(&self.header)
            .map(|value| value.to_str().map_err(|_| AuthError::InvalidToken))
            .transpose()
            .and_then(|token| self.verifier.verify(token));

        match verified {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, path = %req.path(), "request authenticated");
                req.extensions_mut().insert(identity);
                Box::pin(async move { service.call(req).await })
            }
            Err(reason) => {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.path(),
                    reason = %reason,
                    "request rejected by authorization gate"
                );
                Box::pin(async move { Err(AuthRejection(reason).into()) })
            }
        }
    }
}

/// Identity resolved by [`AuthorizationGate`], extracted in handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .map(AuthenticatedUser)
                .ok_or_else(|| AuthRejection(AuthError::MissingToken).into()),
        )
    }
}
