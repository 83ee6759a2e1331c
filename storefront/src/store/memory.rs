// bazaar/src/store/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::{normalize_email, CatalogStore, OrderStore};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderItem, OrderStatus, PaymentStatus, Product};

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  orders: HashMap<Uuid, Order>,
  items: Vec<OrderItem>,
  // Unique order numbers and tracking codes, mirroring the SQL constraints.
  order_numbers: HashSet<String>,
  tracking_codes: HashSet<String>,
}

/// Process-local backend. One mutex covers every table, so each trait call
/// is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
    let store = Self::new();
    {
      let mut tables = store.tables.lock();
      for product in products {
        tables.products.insert(product.id, product);
      }
    }
    store
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  pub fn item_count(&self) -> usize {
    self.tables.lock().items.len()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn find_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
    let tables = self.tables.lock();
    Ok(ids.iter().filter_map(|id| tables.products.get(id).cloned()).collect())
  }

  async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
    Ok(self.tables.lock().products.get(&id).cloned())
  }

  async fn upsert_product(&self, product: &Product) -> AppResult<()> {
    let mut updated = product.clone();
    updated.updated_at = Utc::now();
    self.tables.lock().products.insert(product.id, updated);
    Ok(())
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<bool> {
    let mut tables = self.tables.lock();
    let Some(product) = tables.products.get_mut(&id) else {
      return Ok(false);
    };
    if !product.can_fulfil(quantity) {
      return Ok(false);
    }
    product.stock -= quantity;
    product.in_stock = product.stock > 0;
    product.updated_at = Utc::now();
    Ok(true)
  }

  async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
    let mut tables = self.tables.lock();
    let product = tables
      .products
      .get_mut(&id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
    product.stock += quantity;
    product.in_stock = product.stock > 0;
    product.updated_at = Utc::now();
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: &Order) -> AppResult<()> {
    let mut tables = self.tables.lock();
    let clash =
      tables.order_numbers.contains(&order.order_number) || tables.tracking_codes.contains(&order.tracking_code);
    if clash || tables.orders.contains_key(&order.id) {
      return Err(AppError::Internal(format!(
        "Order identifiers already in use: {} / {}",
        order.order_number, order.tracking_code
      )));
    }
    tables.order_numbers.insert(order.order_number.clone());
    tables.tracking_codes.insert(order.tracking_code.clone());
    tables.orders.insert(order.id, order.clone());
    Ok(())
  }

  async fn insert_order_items(&self, items: &[OrderItem]) -> AppResult<()> {
    let mut tables = self.tables.lock();
    if let Some(orphan) = items.iter().find(|item| !tables.orders.contains_key(&item.order_id)) {
      return Err(AppError::Internal(format!("Order {} does not exist", orphan.order_id)));
    }
    tables.items.extend(items.iter().cloned());
    Ok(())
  }

  async fn delete_order_items(&self, order_id: Uuid) -> AppResult<u64> {
    let mut tables = self.tables.lock();
    let before = tables.items.len();
    tables.items.retain(|item| item.order_id != order_id);
    Ok((before - tables.items.len()) as u64)
  }

  async fn mark_order_failed(&self, order_id: Uuid) -> AppResult<()> {
    let mut tables = self.tables.lock();
    let order = tables
      .orders
      .get_mut(&order_id)
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;
    order.order_status = OrderStatus::Cancelled;
    order.payment_status = PaymentStatus::Failed;
    order.updated_at = Utc::now();
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
    Ok(self.tables.lock().orders.get(&id).cloned())
  }

  async fn find_order_by_tracking_code(&self, tracking_code: &str) -> AppResult<Option<Order>> {
    let tables = self.tables.lock();
    Ok(tables.orders.values().find(|o| o.tracking_code == tracking_code).cloned())
  }

  async fn tracking_code_exists(&self, tracking_code: &str) -> AppResult<bool> {
    Ok(self.tables.lock().tracking_codes.contains(tracking_code))
  }

  async fn list_order_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let tables = self.tables.lock();
    Ok(tables.items.iter().filter(|i| i.order_id == order_id).cloned().collect())
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables
      .orders
      .values()
      .filter(|o| o.user_id == Some(user_id))
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn link_guest_orders(&self, email: &str, user_id: Uuid) -> AppResult<u64> {
    let wanted = normalize_email(email);
    let now = Utc::now();
    let mut tables = self.tables.lock();
    let mut linked = 0;
    for order in tables.orders.values_mut() {
      let matches = order.guest_email.as_deref().map(normalize_email).as_deref() == Some(wanted.as_str());
      if order.is_guest && matches {
        order.user_id = Some(user_id);
        order.is_guest = false;
        order.updated_at = now;
        linked += 1;
      }
    }
    Ok(linked)
  }

  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool> {
    let mut tables = self.tables.lock();
    let stored = tables
      .orders
      .get_mut(&order.id)
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order.id)))?;
    if stored.order_status != expected {
      return Ok(false);
    }
    stored.order_status = order.order_status;
    stored.delivered_at = order.delivered_at;
    stored.updated_at = order.updated_at;
    Ok(true)
  }
}
