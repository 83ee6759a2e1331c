// bazaar/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::{OrderStatus, OrderView};
use crate::services::orders;
use crate::state::AppState;
use crate::web::extractors::{parse_id, AdminAccess};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::update_order_status", skip(app_state, _admin), fields(status = %payload.status))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<UpdateStatusPayload>,
  _admin: AdminAccess,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_id(&path, "order")?;
  let order = orders::update_status(&app_state, order_id, payload.status).await?;
  Ok(HttpResponse::Ok().json(OrderView::from(order)))
}
