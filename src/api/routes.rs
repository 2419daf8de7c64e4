//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{OperationContext, SignupError};
use crate::error::{AppError, AppResult};
use crate::handlers::{NotificationStatus, SignupCommand, SignupHandler};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub signup: Arc<SignupHandler>,
}

impl AppState {
    pub fn new(signup: SignupHandler) -> Self {
        Self {
            signup: Arc::new(signup),
        }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

/// Checkout form, field names as sent by the signup page
#[derive(Clone, Deserialize, Serialize)]
pub struct CheckoutRequest {
    pub nome: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub whatsapp: String,
    pub empresa: String,
    pub senha: String,
    pub plano: String,
    pub metodo: String,
}

impl std::fmt::Debug for CheckoutRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutRequest")
            .field("nome", &self.nome)
            .field("email", &self.email)
            .field("empresa", &self.empresa)
            .field("plano", &self.plano)
            .field("metodo", &self.metodo)
            .field("senha", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CheckoutRequest {
    /// Map the form onto a command
    ///
    /// The password policy is checked first so a short password answers 400 even
    /// when identity fields are blank. Blank `nome`, `email` or `empresa` are then
    /// rejected as an invalid payload.
    pub fn into_command(self) -> AppResult<SignupCommand> {
        let command = SignupCommand {
            name: self.nome,
            email: self.email,
            tax_id: self.cpf_cnpj,
            phone: self.whatsapp,
            company: self.empresa,
            password: self.senha,
            plan: self.plano,
            payment_method: self.metodo,
        };

        command.validate()?;

        for (field, value) in [
            ("nome", &command.name),
            ("email", &command.email),
            ("empresa", &command.company),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidPayload(format!(
                    "o campo `{}` é obrigatório",
                    field
                )));
            }
        }

        Ok(command)
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new().route("/api/checkout", post(checkout))
}

// =========================================================================
// POST /api/checkout
// =========================================================================

/// Register an organization and its administrator
async fn checkout(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected checkout payload");
        AppError::InvalidPayload(rejection.body_text())
    })?;

    let command = request.into_command()?;
    let outcome = state.signup.execute(command, &context).await?;

    match outcome.notification {
        NotificationStatus::Failed(e) => Err(SignupError::NotifyFailed(e).into()),
        NotificationStatus::Delivered | NotificationStatus::Dispatched => Ok((
            StatusCode::OK,
            Json(CheckoutResponse {
                message: "Sucesso".to_string(),
            }),
        )
            .into_response()),
    }
}
