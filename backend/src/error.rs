//! HTTP error mapping shared by every handler.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;

use crate::auth::credentials::CredentialError;
use crate::auth::jwt::JwtError;
use crate::chat::ChatError;
use crate::pipeline::PipelineError;
use crate::storage::StorageError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(msg) = self {
            log::error!("Internal error: {}", msg);
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidPatient(_) | PipelineError::Schema(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PipelineError::Registry(_) | PipelineError::Scoring(_) | PipelineError::Report(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::BlankField(_) => ApiError::BadRequest(err.to_string()),
            CredentialError::DuplicateEmail => ApiError::Conflict(err.to_string()),
            CredentialError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            CredentialError::Unavailable => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileName | StorageError::NotFound => {
                ApiError::NotFound("Report not found".to_string())
            }
            StorageError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Disease, SchemaError};

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                PipelineError::InvalidPatient("Patient name is required".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::Schema(SchemaError::LengthMismatch {
                    disease: Disease::Diabetes,
                    expected: 8,
                    actual: 7,
                })
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (CredentialError::DuplicateEmail.into(), StatusCode::CONFLICT),
            (CredentialError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (StorageError::InvalidFileName.into(), StatusCode::NOT_FOUND),
            (ChatError::EmptyMessage.into(), StatusCode::BAD_REQUEST),
            (ChatError::NotConfigured.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[test]
    fn body_has_kind_and_message() {
        let body = ApiError::Conflict("taken".into()).body();
        assert_eq!(body.error, "conflict");
        assert_eq!(body.message, "taken");
    }
}
