// bazaar/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::CheckoutForm;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::pipelines::place_order_pipeline::place_order;
use crate::services::orders;
use crate::state::AppState;
use crate::web::extractors::{parse_id, AuthenticatedUser};

#[instrument(
  name = "handler::place_order",
  skip(app_state, form, auth_user),
  fields(user_id = %auth_user.user_id, lines = form.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  form: web::Json<CheckoutForm>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ctx = PlaceOrderCtxData::for_customer(app_state.get_ref().clone(), auth_user.user_id, form.into_inner());
  let detail = place_order(ctx).await?;
  Ok(HttpResponse::Created().json(detail))
}

#[instrument(name = "handler::place_guest_order", skip(app_state, form), fields(lines = form.items.len()))]
pub async fn place_guest_order_handler(
  app_state: web::Data<AppState>,
  form: web::Json<CheckoutForm>,
) -> Result<HttpResponse, AppError> {
  let ctx = PlaceOrderCtxData::for_guest(app_state.get_ref().clone(), form.into_inner());
  let detail = place_order(ctx).await?;
  Ok(HttpResponse::Created().json(detail))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = orders::list_for_customer(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = parse_id(&path, "order")?;
  let detail = orders::get_for_customer(&app_state, auth_user.user_id, order_id).await?;
  Ok(HttpResponse::Ok().json(detail))
}

#[derive(Debug, Deserialize)]
pub struct LinkGuestOrdersPayload {
  #[serde(default)]
  pub email: String,
}

#[instrument(name = "handler::link_guest_orders", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn link_guest_orders_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LinkGuestOrdersPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let linked = orders::link_guest_orders(&app_state, auth_user.user_id, &payload.email).await?;
  info!(linked, "Guest orders linked.");
  Ok(HttpResponse::Ok().json(json!({ "linked": linked })))
}
