// board-collab-service/src/models/mod.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;

pub mod board;
pub use board::*;

pub mod collaboration;
pub use collaboration::*;

pub mod events;
pub use events::*;

pub mod permissions;
pub use permissions::*;

// Error taxonomy shared by every service operation
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Forbidden")]
    Forbidden,
    #[display(fmt = "Not Found: {}", _0)]
    NotFound(String),
    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),
    #[display(fmt = "Invalid state: {}", _0)]
    InvalidState(String),
    #[display(fmt = "Invalid role: {}", _0)]
    InvalidRole(String),
    #[display(fmt = "Cannot invite the project owner")]
    SelfInvite,
}

impl ServiceError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{} {} not found", what, id))
    }

    // Stable machine-readable error kind for clients
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InternalServerError => "internal",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Forbidden => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::InvalidRole(_) => "invalid_role",
            ServiceError::SelfInvite => "self_invite",
        }
    }

    // Only transient failures may be retried by a client; everything else
    // needs a changed input, a new invitation or a refetch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::InternalServerError)
    }

    // Errors after which the client cache can no longer be trusted
    pub fn requires_refetch(&self) -> bool {
        matches!(self, ServiceError::Forbidden | ServiceError::NotFound(_))
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            ServiceError::SelfInvite => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}
