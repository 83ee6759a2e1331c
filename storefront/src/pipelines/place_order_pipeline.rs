// bazaar/src/pipelines/place_order_pipeline.rs

//! Order placement as a compensating pipeline.
//!
//! Steps up to `allocate_identifiers` only read. From `insert_order` on,
//! every write registers a compensator, so a failure anywhere afterwards
//! cancels the order, removes its items and puts decremented stock back.

use anyhow::anyhow;
use bazaar_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl, PipelineResult, SkipCondition};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::identifiers::{allocate_tracking_code, generate_order_number};
use crate::services::mailer::order_confirmation;
use crate::services::orders::order_detail;
use crate::services::phone::normalize_phone;

pub const PLACE_ORDER_STEPS: [&str; 11] = [
  "require_guest_email",
  "validate_cart",
  "load_products",
  "check_stock",
  "reconcile_totals",
  "normalize_contact",
  "allocate_identifiers",
  "insert_order",
  "insert_line_items",
  "decrement_stock",
  "send_confirmation",
];

pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, AppError> {
  let guests_only: SkipCondition<PlaceOrderCtxData> = Arc::new(|ctx_data: ContextData<PlaceOrderCtxData>| !ctx_data.read().guest);

  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("require_guest_email", false, Some(guests_only)),
    ("validate_cart", false, None),
    ("load_products", false, None),
    ("check_stock", false, None),
    ("reconcile_totals", false, None),
    ("normalize_contact", false, None),
    ("allocate_identifiers", false, None),
    ("insert_order", false, None),
    ("insert_line_items", false, None),
    ("decrement_stock", false, None),
    ("send_confirmation", true, None),
  ]);

  p.on("require_guest_email", require_guest_email);
  p.on("validate_cart", validate_cart);
  p.on("load_products", load_products);
  p.on("check_stock", check_stock);
  p.on("reconcile_totals", reconcile_totals);
  p.on("normalize_contact", normalize_contact);
  p.on("allocate_identifiers", allocate_identifiers);

  p.on("insert_order", insert_order);
  p.compensate("insert_order", cancel_order);

  p.on("insert_line_items", insert_line_items);
  p.compensate("insert_line_items", delete_line_items);

  p.on("decrement_stock", decrement_stock);
  p.compensate("decrement_stock", restore_stock);

  p.on("send_confirmation", send_confirmation);
  p
}

pub fn register_place_order_pipeline(flows: &FlowRegistry<AppError>) {
  flows.register_pipeline(build_place_order_pipeline());
  info!("Place-order pipeline registered.");
}

/// Runs the registered placement pipeline and returns the created order with
/// its items, each populated with the current product.
#[instrument(name = "place_order", skip(ctx), fields(guest = ctx.guest, lines = ctx.form.items.len()))]
pub async fn place_order(ctx: PlaceOrderCtxData) -> AppResult<OrderDetail> {
  let app_state = ctx.app_state.clone();
  let ctx_data = ContextData::new(ctx);

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      error!("Place-order pipeline stopped without an error.");
      return Err(AppError::Internal("Order placement did not complete".to_string()));
    }
  }

  let (order, items) = {
    let guard = ctx_data.read();
    (guard.order.clone(), guard.items.clone())
  };
  let order = order.ok_or_else(|| AppError::Internal("Order missing after placement".to_string()))?;
  info!(order_id = %order.id, order_number = %order.order_number, "Order placed.");
  order_detail(&app_state, order, items).await
}

// --- Read-only steps ---

async fn require_guest_email(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let email = guard.form.email.trim().to_string();
  if email.is_empty() {
    return Err(AppError::InvalidRequest("email is required for guest orders".to_string()));
  }
  guard.form.email = email;
  Ok(PipelineControl::Continue)
}

async fn validate_cart(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  if guard.form.items.is_empty() {
    return Err(AppError::InvalidRequest("cart is empty".to_string()));
  }

  let mut demand: Vec<(Uuid, i32)> = Vec::new();
  for line in &guard.form.items {
    if line.quantity < 1 {
      return Err(AppError::InvalidRequest(format!(
        "quantity for product {} must be at least 1",
        line.product_id
      )));
    }
    match demand.iter_mut().find(|(id, _)| *id == line.product_id) {
      Some((_, total)) => {
        *total = total
          .checked_add(line.quantity)
          .ok_or_else(|| AppError::InvalidRequest(format!("quantity for product {} is too large", line.product_id)))?;
      }
      None => demand.push((line.product_id, line.quantity)),
    }
  }
  guard.demand = demand;
  Ok(PipelineControl::Continue)
}

async fn load_products(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (catalog, ids) = {
    let guard = ctx_data.read();
    let ids: Vec<Uuid> = guard.demand.iter().map(|(id, _)| *id).collect();
    (guard.app_state.catalog.clone(), ids)
  };

  let products: HashMap<Uuid, _> = catalog
    .find_products(&ids)
    .await?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();
  if let Some(missing) = ids.iter().find(|id| !products.contains_key(id)) {
    return Err(AppError::NotFound(format!("Product {} not found", missing)));
  }

  ctx_data.write().products = products;
  Ok(PipelineControl::Continue)
}

async fn check_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let guard = ctx_data.read();
  for (product_id, requested) in &guard.demand {
    let product = guard
      .products
      .get(product_id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
    if !product.can_fulfil(*requested) {
      return Err(AppError::InsufficientStock {
        product_id: product.id,
        product_name: product.name.clone(),
        available: if product.in_stock { product.stock } else { 0 },
        requested: *requested,
      });
    }
  }
  Ok(PipelineControl::Continue)
}

async fn reconcile_totals(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let out_of_range = || AppError::InvalidRequest("order amounts are out of range".to_string());

  let mut line_total = Decimal::ZERO;
  for line in &guard.form.items {
    let Some(product) = guard.products.get(&line.product_id) else {
      continue;
    };
    line_total = product
      .price
      .checked_mul(Decimal::from(line.quantity))
      .and_then(|amount| line_total.checked_add(amount))
      .ok_or_else(out_of_range)?;
  }
  let expected_total = guard.form.expected_total().ok_or_else(out_of_range)?;

  let subtotal_matches = guard.form.subtotal == line_total;
  let total_matches = guard.form.total_payable == expected_total;
  if !(subtotal_matches && total_matches) {
    warn!(
      %line_total,
      submitted_subtotal = %guard.form.subtotal,
      submitted_total = %guard.form.total_payable,
      %expected_total,
      "Submitted totals differ from the server computation."
    );
    if guard.app_state.config.enforce_server_totals {
      return Err(AppError::InvalidRequest(format!(
        "submitted totals do not match: line total is {}, subtotal {}, total payable {}",
        line_total, guard.form.subtotal, guard.form.total_payable
      )));
    }
  }
  guard.line_total = line_total;
  Ok(PipelineControl::Continue)
}

async fn normalize_contact(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  guard.phone = normalize_phone(&guard.form.phone);
  Ok(PipelineControl::Continue)
}

async fn allocate_identifiers(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (orders, attempts) = ctx_data.with(|c| (c.app_state.orders.clone(), c.app_state.config.tracking_code_attempts));
  let tracking_code = allocate_tracking_code(orders.as_ref(), attempts).await?;

  let mut guard = ctx_data.write();
  guard.order_number = Some(generate_order_number());
  guard.tracking_code = Some(tracking_code);
  Ok(PipelineControl::Continue)
}

// --- Writes and their compensators ---

fn draft_order(ctx: &PlaceOrderCtxData) -> AppResult<Order> {
  let missing = || AppError::Internal("Order identifiers were not allocated".to_string());
  let form = &ctx.form;
  let now = Utc::now();
  Ok(Order {
    id: Uuid::new_v4(),
    order_number: ctx.order_number.clone().ok_or_else(missing)?,
    tracking_code: ctx.tracking_code.clone().ok_or_else(missing)?,
    user_id: ctx.customer_id,
    is_guest: ctx.guest,
    guest_email: ctx.guest.then(|| form.email.clone()),
    firstname: form.firstname.trim().to_string(),
    lastname: form.lastname.trim().to_string(),
    phone: ctx.phone.clone(),
    email: form.email.trim().to_string(),
    house_street: form.house_street.clone(),
    city: form.city.clone(),
    subdistrict: form.subdistrict.clone(),
    postcode: form.postcode.clone(),
    country: form.country.clone(),
    shipping_type: form.shipping_type.clone(),
    pickup_point_id: form.pickup_point_id.clone(),
    payment_method: form.payment_method.clone(),
    transaction_id: form.transaction_id.clone(),
    terms_accepted: form.terms_accepted,
    subtotal: form.subtotal,
    discount: form.discount,
    delivery_charge: form.delivery_charge,
    additional_charge: form.additional_charge,
    total_payable: form.total_payable,
    order_status: OrderStatus::Pending,
    payment_status: PaymentStatus::Pending,
    delivered_at: None,
    created_at: now,
    updated_at: now,
  })
}

async fn insert_order(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (orders, order) = {
    let guard = ctx_data.read();
    (guard.app_state.orders.clone(), draft_order(&guard)?)
  };
  orders.insert_order(&order).await?;
  info!(order_id = %order.id, order_number = %order.order_number, "Order record inserted.");
  ctx_data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn cancel_order(ctx_data: ContextData<PlaceOrderCtxData>) -> anyhow::Result<()> {
  let (orders, order_id) = ctx_data.with(|c| (c.app_state.orders.clone(), c.order.as_ref().map(|o| o.id)));
  let Some(order_id) = order_id else {
    return Ok(());
  };
  orders.mark_order_failed(order_id).await?;
  warn!(%order_id, "Order marked cancelled after failed placement.");
  Ok(())
}

async fn insert_line_items(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (orders, items) = {
    let guard = ctx_data.read();
    let order_id = guard
      .order
      .as_ref()
      .map(|o| o.id)
      .ok_or_else(|| AppError::Internal("Line items need an inserted order".to_string()))?;
    let mut items = Vec::with_capacity(guard.form.items.len());
    for line in &guard.form.items {
      let product = guard
        .products
        .get(&line.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", line.product_id)))?;
      items.push(OrderItem::snapshot(order_id, product, line.quantity, line.variant.clone())?);
    }
    (guard.app_state.orders.clone(), items)
  };
  orders.insert_order_items(&items).await?;
  ctx_data.write().items = items;
  Ok(PipelineControl::Continue)
}

async fn delete_line_items(ctx_data: ContextData<PlaceOrderCtxData>) -> anyhow::Result<()> {
  let (orders, order_id) = ctx_data.with(|c| (c.app_state.orders.clone(), c.order.as_ref().map(|o| o.id)));
  let Some(order_id) = order_id else {
    return Ok(());
  };
  let removed = orders.delete_order_items(order_id).await?;
  warn!(%order_id, removed, "Line items removed after failed placement.");
  Ok(())
}

async fn decrement_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (catalog, demand) = {
    let guard = ctx_data.read();
    (guard.app_state.catalog.clone(), guard.demand.clone())
  };

  for (product_id, quantity) in demand {
    if catalog.decrement_stock(product_id, quantity).await? {
      ctx_data.write().decremented.push((product_id, quantity));
      continue;
    }
    // Someone else took the stock between the check and the write.
    let current = catalog
      .get_product(product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
    warn!(%product_id, requested = quantity, available = current.stock, "Stock ran out during placement.");
    return Err(AppError::InsufficientStock {
      product_id,
      product_name: current.name,
      available: if current.in_stock { current.stock } else { 0 },
      requested: quantity,
    });
  }
  Ok(PipelineControl::Continue)
}

async fn restore_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> anyhow::Result<()> {
  let (catalog, decremented) = ctx_data.with(|c| (c.app_state.catalog.clone(), c.decremented.clone()));

  let mut failed = Vec::new();
  for (product_id, quantity) in decremented.into_iter().rev() {
    match catalog.restock(product_id, quantity).await {
      Ok(()) => warn!(%product_id, quantity, "Stock restored after failed placement."),
      Err(e) => {
        error!(%product_id, quantity, error = %e, "Could not restore stock.");
        failed.push(product_id);
      }
    }
  }
  if failed.is_empty() {
    Ok(())
  } else {
    Err(anyhow!("stock could not be restored for products {:?}", failed))
  }
}

// --- Notification ---

async fn send_confirmation(ctx_data: ContextData<PlaceOrderCtxData>) -> AppResult<PipelineControl> {
  let (mailer, email) = {
    let guard = ctx_data.read();
    let Some(order) = guard.order.as_ref() else {
      return Ok(PipelineControl::Continue);
    };
    if order.email.is_empty() {
      info!(order_id = %order.id, "No contact email, skipping confirmation.");
      return Ok(PipelineControl::Continue);
    }
    let email = order_confirmation(order, &guard.items, &guard.app_state.config.mail_sender);
    (guard.app_state.mailer.clone(), email)
  };

  match mailer.send(&email).await {
    Ok(message_id) => ctx_data.write().confirmation_id = Some(message_id),
    Err(e) => warn!(to = %email.to, error = %e, "Order confirmation could not be sent."),
  }
  Ok(PipelineControl::Continue)
}
