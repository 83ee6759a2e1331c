// bazaar/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bazaar_flow::FlowError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("Authentication failed: {0}")]
  Auth(String),

  #[error("Resource not found: {0}")]
  NotFound(String),

  #[error("Insufficient stock for '{product_name}' ({product_id}): requested {requested}, available {available}")]
  InsufficientStock {
    product_id: Uuid,
    product_name: String,
    available: i32,
    requested: i32,
  },

  #[error("Order status cannot change from {from} to {to}")]
  InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal server error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InsufficientStock { .. } | AppError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::info!(application_error = %self, "Responding with client error");
    }
    let body = match self {
      AppError::InvalidRequest(m) | AppError::Auth(m) | AppError::NotFound(m) => json!({ "error": m }),
      AppError::InsufficientStock {
        product_id,
        product_name,
        available,
        requested,
      } => json!({
        "error": self.to_string(),
        "productId": product_id,
        "productName": product_name,
        "available": available,
        "requested": requested,
      }),
      AppError::InvalidStatusTransition { .. } => json!({ "error": self.to_string() }),
      AppError::Config(_) => json!({ "error": "Configuration issue" }),
      AppError::Sqlx(_) => json!({ "error": "Database operation failed" }),
      AppError::Workflow { .. } => json!({ "error": "Workflow processing error" }),
      AppError::Internal(_) => json!({ "error": "An internal error occurred" }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
