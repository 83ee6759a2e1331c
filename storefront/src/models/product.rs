// bazaar/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog product as far as ordering is concerned.
///
/// `stock` never goes below zero through this service. `in_stock` is the
/// merchandising flag: a product with stock but `in_stock == false` cannot
/// be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub stock: i32,
  pub in_stock: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn new(name: impl Into<String>, price: Decimal, stock: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      price,
      stock,
      in_stock: stock > 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn can_fulfil(&self, quantity: i32) -> bool {
    self.in_stock && self.stock >= quantity
  }
}
