// bazaar/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  /// Lifecycle: pending -> confirmed -> processing -> shipped -> delivered,
  /// with pending allowed to jump straight to processing. Any non-terminal
  /// status may be cancelled. Re-applying the current status is allowed.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    if self == next {
      return true;
    }
    match (self, next) {
      (Delivered | Cancelled, _) => false,
      (_, Cancelled) => true,
      (Pending, Confirmed | Processing) => true,
      (Confirmed, Processing) => true,
      (Processing, Shipped) => true,
      (Shipped, Delivered) => true,
      _ => false,
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
  Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub tracking_code: String,

  /// Owning customer; `None` for a guest order that has not been linked yet.
  pub user_id: Option<Uuid>,
  pub is_guest: bool,
  pub guest_email: Option<String>,

  pub firstname: String,
  pub lastname: String,
  pub phone: String,
  pub email: String,
  pub house_street: String,
  pub city: String,
  pub subdistrict: String,
  pub postcode: String,
  pub country: String,

  pub shipping_type: String,
  pub pickup_point_id: Option<String>,
  pub payment_method: String,
  pub transaction_id: Option<String>,
  pub terms_accepted: bool,

  // Monetary fields are stored as submitted by the client.
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub delivery_charge: Decimal,
  pub additional_charge: Decimal,
  pub total_payable: Decimal,

  pub order_status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub delivered_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Moves the order to `next`, stamping `delivered_at` the first time it
  /// becomes delivered. Returns whether anything changed.
  pub fn transition_to(&mut self, next: OrderStatus, at: DateTime<Utc>) -> AppResult<bool> {
    if !self.order_status.can_transition_to(next) {
      return Err(AppError::InvalidStatusTransition {
        from: self.order_status,
        to: next,
      });
    }
    if self.order_status == next {
      return Ok(false);
    }
    self.order_status = next;
    if next == OrderStatus::Delivered && self.delivered_at.is_none() {
      self.delivered_at = Some(at);
    }
    self.updated_at = at;
    Ok(true)
  }
}
