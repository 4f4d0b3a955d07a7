// board-collab-service/src/utils/identity.rs
//
// Identity is issued upstream; the gateway forwards the authenticated
// principal in `X-User-Id`. This middleware only lifts it into the request.
use crate::models::ServiceError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::body::EitherBody;
use actix_web::{Error, HttpMessage, HttpRequest};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;

pub const USER_ID_HEADER: &str = "X-User-Id";

// Authenticated principal for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

// Read the principal placed by the middleware
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    req.extensions()
        .get::<UserContext>()
        .map(|context| context.user_id.clone())
        .ok_or(ServiceError::Unauthorized)
}

fn principal_from_header(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub struct Identity;

impl<S, B> Transform<S, ServiceRequest> for Identity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = IdentityMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(IdentityMiddleware { service })
    }
}

pub struct IdentityMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match principal_from_header(&req) {
            Some(user_id) => {
                debug!("Request {} {} by principal {}", req.method(), req.path(), user_id);
                req.extensions_mut().insert(UserContext { user_id });
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            None => {
                debug!("Rejecting {} {}: missing {}", req.method(), req.path(), USER_ID_HEADER);
                let response = req
                    .error_response(ServiceError::Unauthorized)
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
