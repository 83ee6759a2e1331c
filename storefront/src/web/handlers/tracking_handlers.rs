// bazaar/src/web/handlers/tracking_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::orders;
use crate::state::AppState;

/// Anonymous lookup; the response is redacted.
#[instrument(name = "handler::track_order", skip(app_state))]
pub async fn track_order_handler(
  app_state: web::Data<AppState>,
  tracking_code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let view = orders::track(&app_state, &tracking_code).await?;
  Ok(HttpResponse::Ok().json(view))
}
