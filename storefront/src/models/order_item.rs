// bazaar/src/models/order_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::Product;

/// A line of a placed order. Name and price are copied from the product at
/// placement time and are never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub product_name: String,
  pub product_price: Decimal,
  pub quantity: i32,
  pub variant: Option<String>,
  pub subtotal: Decimal,
  pub created_at: DateTime<Utc>,
}

impl OrderItem {
  pub fn snapshot(order_id: Uuid, product: &Product, quantity: i32, variant: Option<String>) -> AppResult<Self> {
    let subtotal = product.price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
      AppError::InvalidRequest(format!("line total for product {} is out of range", product.id))
    })?;
    Ok(Self {
      id: Uuid::new_v4(),
      order_id,
      product_id: product.id,
      product_name: product.name.clone(),
      product_price: product.price,
      quantity,
      variant,
      subtotal,
      created_at: Utc::now(),
    })
  }
}
