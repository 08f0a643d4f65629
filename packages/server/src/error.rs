use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Error payload carried in the `data` field of the response envelope.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `validationError`,
    /// `parametersError`, `emptyBodyError`, `duplicateKeyError`,
    /// `unauthorizedError`, `credentialError`, `forbiddenError`,
    /// `verifiedError`, `notFoundError`, `internalServerError`.
    #[schema(example = "validationError")]
    pub error_code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Title must be at least 4 characters")]
    pub message: String,
}

/// Response envelope used for error bodies. Success payloads are wrapped
/// by [`crate::models::shared::Envelope`]; both shapes agree on
/// `{status, success, data}`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorEnvelope {
    /// HTTP status code, repeated in the body.
    #[schema(example = 400)]
    pub status: u16,
    /// Always `false` for errors.
    #[schema(example = false)]
    pub success: bool,
    pub data: ErrorBody,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    MissingParameters(String),
    EmptyBody,
    DuplicateKey,
    Unauthorized,
    InvalidCredentials,
    Forbidden,
    VerificationRequired,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error_code: "validationError",
                    message: msg,
                },
            ),
            AppError::MissingParameters(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error_code: "parametersError",
                    message: msg,
                },
            ),
            AppError::EmptyBody => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error_code: "emptyBodyError",
                    message: "Body is empty".into(),
                },
            ),
            AppError::DuplicateKey => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error_code: "duplicateKeyError",
                    message: "One of the key parameters is already used".into(),
                },
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error_code: "unauthorizedError",
                    message: "This method requires authentication".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error_code: "credentialError",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error_code: "forbiddenError",
                    message: "Forbidden action".into(),
                },
            ),
            AppError::VerificationRequired => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error_code: "verifiedError",
                    message: "Account is not verified".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error_code: "notFoundError",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error_code: "internalServerError",
                        message: "Internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        let envelope = ErrorEnvelope {
            status: status.as_u16(),
            success: false,
            data: body,
        };
        (status, Json(envelope)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
