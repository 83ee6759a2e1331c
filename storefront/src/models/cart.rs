// bazaar/src/models/cart.rs

use serde::Deserialize;
use uuid::Uuid;

/// One requested line of a checkout. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
  #[serde(rename = "item_id")]
  pub product_id: Uuid,
  #[serde(rename = "item_quantity")]
  pub quantity: i32,
  #[serde(rename = "item_color", default)]
  pub variant: Option<String>,
}

impl CartLine {
  pub fn new(product_id: Uuid, quantity: i32) -> Self {
    Self {
      product_id,
      quantity,
      variant: None,
    }
  }

  pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
    self.variant = Some(variant.into());
    self
  }
}
