// bazaar/src/models/views.rs

//! Response projections of orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderStatus, PaymentStatus, Product};
use crate::services::phone::mask_phone;

/// An order plus the field aliases older clients still read.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
  #[serde(flatten)]
  pub order: Order,
  #[serde(rename = "_id")]
  pub legacy_id: Uuid,
  pub status: OrderStatus,
  #[serde(rename = "trackingId")]
  pub tracking_id: String,
  pub user: Option<Uuid>,
}

impl From<Order> for OrderView {
  fn from(order: Order) -> Self {
    Self {
      legacy_id: order.id,
      status: order.order_status,
      tracking_id: order.tracking_code.clone(),
      user: order.user_id,
      order,
    }
  }
}

/// A line item with the product as it is now, for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: Option<Product>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
  pub order: OrderView,
  pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingItem {
  pub product_name: String,
  pub product_price: Decimal,
  pub quantity: i32,
  pub variant: Option<String>,
  pub subtotal: Decimal,
}

/// What an anonymous caller holding a tracking code may see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
  pub order_number: String,
  pub tracking_code: String,
  pub firstname: String,
  pub lastname: String,
  pub phone: String,
  pub order_status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub shipping_type: String,
  pub subtotal: Decimal,
  pub discount: Decimal,
  pub delivery_charge: Decimal,
  pub additional_charge: Decimal,
  pub total_payable: Decimal,
  pub delivered_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub items: Vec<TrackingItem>,
}

impl TrackingView {
  pub fn redact(order: &Order, items: &[OrderItem]) -> Self {
    Self {
      order_number: order.order_number.clone(),
      tracking_code: order.tracking_code.clone(),
      firstname: mask_name(&order.firstname),
      lastname: mask_name(&order.lastname),
      phone: mask_phone(&order.phone),
      order_status: order.order_status,
      payment_status: order.payment_status,
      shipping_type: order.shipping_type.clone(),
      subtotal: order.subtotal,
      discount: order.discount,
      delivery_charge: order.delivery_charge,
      additional_charge: order.additional_charge,
      total_payable: order.total_payable,
      delivered_at: order.delivered_at,
      created_at: order.created_at,
      updated_at: order.updated_at,
      items: items
        .iter()
        .map(|item| TrackingItem {
          product_name: item.product_name.clone(),
          product_price: item.product_price,
          quantity: item.quantity,
          variant: item.variant.clone(),
          subtotal: item.subtotal,
        })
        .collect(),
    }
  }
}

/// First character kept, every other character replaced by `*`.
pub fn mask_name(name: &str) -> String {
  let mut chars = name.trim().chars();
  match chars.next() {
    Some(first) => std::iter::once(first).chain(chars.map(|_| '*')).collect(),
    None => String::new(),
  }
}
