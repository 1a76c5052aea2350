// storefront/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use kidova_pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Guard violation: the operation needs a signed-in visitor.
  #[error("Sign in required")]
  SignInRequired,

  /// Guard violation: checkout was attempted with nothing in the cart.
  #[error("Cart is empty")]
  EmptyCart,

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Data Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Remote Function Error: {0}")]
  Function(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: PipelineError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<StoreError>() {
      Ok(store_err) => AppError::Store(store_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl AppError {
  /// True when a flow was refused up front (no session, empty cart, bad
  /// input) rather than failing partway.
  pub fn is_guard_violation(&self) -> bool {
    matches!(self, AppError::SignInRequired | AppError::EmptyCart | AppError::Validation(_))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) | AppError::SignInRequired => StatusCode::UNAUTHORIZED,
      AppError::EmptyCart => StatusCode::CONFLICT,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
      AppError::Store(_) | AppError::Function(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Payment(m) => {
        json!({ "error": m })
      }
      AppError::SignInRequired => json!({ "error": "Sign in required", "redirect": "/auth" }),
      AppError::EmptyCart => json!({ "error": "Your cart is empty", "redirect": "/cart" }),
      AppError::Store(e) => json!({ "error": "Data store request failed", "detail": e.to_string() }),
      AppError::Function(m) => json!({ "error": "Payment session could not be created", "detail": m }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Workflow { source } => {
        json!({ "error": "Workflow processing error", "detail": source.to_string() })
      }
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
