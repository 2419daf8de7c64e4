//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::SignupError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

pub const ORGANIZATION_TAKEN: &str = "Esta empresa já possui cadastro.";
pub const INTERNAL_ERROR: &str = "Erro interno no servidor. Tente novamente mais tarde.";
pub const NOTIFICATION_WARNING: &str =
    "Conta criada, mas não foi possível enviar a mensagem de boas-vindas.";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Dados inválidos: {0}")]
    InvalidPayload(String),

    #[error("Rota não encontrada.")]
    NotFound,

    #[error(transparent)]
    Signup(#[from] SignupError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_code: String,
}

/// Success body for a signup whose welcome message was not delivered
#[derive(Debug, Serialize)]
pub struct WarningResponse {
    pub message: String,
    pub warning: String,
}

impl WarningResponse {
    pub fn notification_failed() -> Self {
        Self {
            message: "Sucesso".to_string(),
            warning: NOTIFICATION_WARNING.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, detail) = match &self {
            // 422 Unprocessable Entity
            AppError::InvalidPayload(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_payload",
                self.to_string(),
            ),

            // 404 Not Found
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),

            AppError::Signup(err) => match err {
                // 400 Bad Request
                SignupError::ValidationFailed { reason, .. } => {
                    (StatusCode::BAD_REQUEST, "validation_failed", reason.clone())
                }
                SignupError::ConflictDetected { .. } => (
                    StatusCode::BAD_REQUEST,
                    "organization_exists",
                    ORGANIZATION_TAKEN.to_string(),
                ),

                // 201: the account exists, only the welcome message is missing
                SignupError::NotifyFailed(e) => {
                    tracing::warn!("Notification error: {}", e);
                    return (
                        StatusCode::CREATED,
                        Json(WarningResponse::notification_failed()),
                    )
                        .into_response();
                }

                // 500 Internal Server Error
                SignupError::StoreUnavailable { source } => {
                    tracing::error!("Directory store error: {:?}", source);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "store_unavailable",
                        INTERNAL_ERROR.to_string(),
                    )
                }
                SignupError::CredentialHashing(msg) => {
                    tracing::error!("Credential hashing error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        INTERNAL_ERROR.to_string(),
                    )
                }
            },
        };

        let body = ErrorResponse {
            detail,
            error_code: error_code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;
    use crate::store::StoreError;

    #[test]
    fn test_status_per_variant() {
        let cases = vec![
            (AppError::InvalidPayload("x".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (
                SignupError::validation("senha", "curta").into(),
                StatusCode::BAD_REQUEST,
            ),
            (SignupError::conflict("Lab1").into(), StatusCode::BAD_REQUEST),
            (
                SignupError::from(StoreError::Timeout).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SignupError::CredentialHashing("boom".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SignupError::from(NotifyError::Email("smtp down".to_string())).into(),
                StatusCode::CREATED,
            ),
        ];

        for (err, expected) in cases {
            let label = format!("{:?}", err);
            assert_eq!(err.into_response().status(), expected, "{}", label);
        }
    }

    #[test]
    fn test_invalid_payload_message() {
        let err = AppError::InvalidPayload("missing field `senha`".to_string());
        assert_eq!(err.to_string(), "Dados inválidos: missing field `senha`");
    }
}
