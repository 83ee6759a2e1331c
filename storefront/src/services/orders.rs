// bazaar/src/services/orders.rs

//! Order reads and post-placement mutations that do not need a pipeline.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderDetail, OrderItem, OrderItemView, OrderStatus, OrderView, TrackingView};
use crate::services::identifiers::is_tracking_code;
use crate::state::AppState;

/// Pairs `order` with its items, each carrying the product as it is now.
pub async fn order_detail(state: &AppState, order: Order, items: Vec<OrderItem>) -> AppResult<OrderDetail> {
  let mut product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
  product_ids.sort_unstable();
  product_ids.dedup();
  let products: HashMap<Uuid, _> = state
    .catalog
    .find_products(&product_ids)
    .await?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();

  let items = items
    .into_iter()
    .map(|item| OrderItemView {
      product: products.get(&item.product_id).cloned(),
      item,
    })
    .collect();
  Ok(OrderDetail {
    order: OrderView::from(order),
    items,
  })
}

#[instrument(name = "orders::list_for_customer", skip(state))]
pub async fn list_for_customer(state: &AppState, user_id: Uuid) -> AppResult<Vec<OrderView>> {
  let orders = state.orders.list_orders_for_user(user_id).await?;
  Ok(orders.into_iter().map(OrderView::from).collect())
}

/// Another customer's order is reported as missing.
#[instrument(name = "orders::get_for_customer", skip(state))]
pub async fn get_for_customer(state: &AppState, user_id: Uuid, order_id: Uuid) -> AppResult<OrderDetail> {
  let order = state
    .orders
    .find_order(order_id)
    .await?
    .filter(|o| o.user_id == Some(user_id))
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;
  let items = state.orders.list_order_items(order.id).await?;
  order_detail(state, order, items).await
}

#[instrument(name = "orders::track", skip(state))]
pub async fn track(state: &AppState, tracking_code: &str) -> AppResult<TrackingView> {
  let tracking_code = tracking_code.trim();
  if !is_tracking_code(tracking_code) {
    return Err(AppError::NotFound(format!("No order with tracking code '{}'", tracking_code)));
  }
  let order = state
    .orders
    .find_order_by_tracking_code(tracking_code)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No order with tracking code '{}'", tracking_code)))?;
  let items = state.orders.list_order_items(order.id).await?;
  Ok(TrackingView::redact(&order, &items))
}

#[instrument(name = "orders::link_guest_orders", skip(state, email))]
pub async fn link_guest_orders(state: &AppState, user_id: Uuid, email: &str) -> AppResult<u64> {
  if email.trim().is_empty() {
    return Err(AppError::InvalidRequest("email is required".to_string()));
  }
  let linked = state.orders.link_guest_orders(email, user_id).await?;
  info!(linked, "Guest orders linked to customer.");
  Ok(linked)
}

#[instrument(name = "orders::update_status", skip(state))]
pub async fn update_status(state: &AppState, order_id: Uuid, next: OrderStatus) -> AppResult<Order> {
  let mut order = state
    .orders
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;
  let previous = order.order_status;
  if !order.transition_to(next, Utc::now())? {
    return Ok(order);
  }
  if !state.orders.update_order_status(&order, previous).await? {
    warn!(%previous, %next, "Order status changed concurrently.");
    let current = state.orders.find_order(order_id).await?.map(|o| o.order_status).unwrap_or(previous);
    return Err(AppError::InvalidStatusTransition { from: current, to: next });
  }
  info!(%previous, %next, "Order status updated.");
  Ok(order)
}
