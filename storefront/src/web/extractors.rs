// bazaar/src/web/extractors.rs

//! Stand-in identity extractors. Token issuance lives outside this service;
//! callers are trusted to forward the identity they authenticated.

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let user_id = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| Uuid::parse_str(v.trim()).ok());
    match user_id {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("Missing or invalid {} header.", USER_ID_HEADER);
        ready(Err(AppError::Auth(format!(
          "Customer authentication required: missing or invalid {} header",
          USER_ID_HEADER
        ))))
      }
    }
  }
}

/// Passes only when `X-Admin-Key` equals the configured `ADMIN_API_KEY`.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured".to_string())));
    };
    let Some(expected) = state.config.admin_api_key.as_deref() else {
      warn!("Admin route called but ADMIN_API_KEY is not set.");
      return ready(Err(AppError::Auth("Admin access is disabled".to_string())));
    };
    let supplied = req.headers().get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok());
    if supplied == Some(expected) {
      ready(Ok(AdminAccess))
    } else {
      warn!("Rejected admin request with missing or wrong key.");
      ready(Err(AppError::Auth("Invalid admin key".to_string())))
    }
  }
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidRequest(format!("'{}' is not a valid {} id", raw, what)))
}
