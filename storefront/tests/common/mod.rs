// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use bazaar::config::AppConfig;
use bazaar::errors::{AppError, Result as AppResult};
use bazaar::models::{CartLine, CheckoutForm, Order, OrderItem, OrderStatus, PaymentStatus, Product};
use bazaar::services::mailer::{Email, LogMailer, Mailer};
use bazaar::state::AppState;
use bazaar::store::{CatalogStore, MemoryStore, OrderStore};
use chrono::Utc;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn product(name: &str, price: i64, stock: i32) -> Product {
  Product::new(name, Decimal::from(price), stock)
}

/// A filled-in form whose submitted totals match the given line total.
pub fn checkout_form(items: Vec<CartLine>, line_total: i64) -> CheckoutForm {
  CheckoutForm {
    items,
    firstname: "Rahim".to_string(),
    lastname: "Uddin".to_string(),
    phone: "+880 1799-424854".to_string(),
    email: "rahim@example.com".to_string(),
    house_street: "12 Lake Road".to_string(),
    city: "Dhaka".to_string(),
    subdistrict: "Gulshan".to_string(),
    postcode: "1212".to_string(),
    country: "Bangladesh".to_string(),
    shipping_type: "home_delivery".to_string(),
    pickup_point_id: None,
    payment_method: "cod".to_string(),
    transaction_id: None,
    terms_accepted: true,
    subtotal: Decimal::from(line_total),
    discount: Decimal::ZERO,
    delivery_charge: Decimal::ZERO,
    additional_charge: Decimal::ZERO,
    total_payable: Decimal::from(line_total),
  }
}

pub fn memory_state(products: Vec<Product>) -> (AppState, Arc<MemoryStore>) {
  memory_state_with(AppConfig::default(), products)
}

pub fn memory_state_with(config: AppConfig, products: Vec<Product>) -> (AppState, Arc<MemoryStore>) {
  let store = Arc::new(MemoryStore::with_products(products));
  (AppState::in_memory(config, store.clone()), store)
}

pub async fn stock_of(store: &MemoryStore, id: Uuid) -> i32 {
  store.get_product(id).await.unwrap().expect("product exists").stock
}

/// Minimal order row for store-level tests.
pub fn bare_order(order_number: String, tracking_code: String) -> Order {
  let now = Utc::now();
  Order {
    id: Uuid::new_v4(),
    order_number,
    tracking_code,
    user_id: None,
    is_guest: true,
    guest_email: Some("guest@example.com".to_string()),
    firstname: "G".to_string(),
    lastname: "Uest".to_string(),
    phone: "01700000000".to_string(),
    email: "guest@example.com".to_string(),
    house_street: String::new(),
    city: String::new(),
    subdistrict: String::new(),
    postcode: String::new(),
    country: String::new(),
    shipping_type: "pickup".to_string(),
    pickup_point_id: None,
    payment_method: "cod".to_string(),
    transaction_id: None,
    terms_accepted: true,
    subtotal: Decimal::ZERO,
    discount: Decimal::ZERO,
    delivery_charge: Decimal::ZERO,
    additional_charge: Decimal::ZERO,
    total_payable: Decimal::ZERO,
    order_status: OrderStatus::Pending,
    payment_status: PaymentStatus::Pending,
    delivered_at: None,
    created_at: now,
    updated_at: now,
  }
}

// --- Failure injection ---

/// Order store whose line-item insert always fails.
pub struct FailingItemsStore {
  pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl OrderStore for FailingItemsStore {
  async fn insert_order(&self, order: &Order) -> AppResult<()> {
    self.inner.insert_order(order).await
  }
  async fn insert_order_items(&self, _items: &[OrderItem]) -> AppResult<()> {
    Err(AppError::Internal("line item storage unavailable".to_string()))
  }
  async fn delete_order_items(&self, order_id: Uuid) -> AppResult<u64> {
    self.inner.delete_order_items(order_id).await
  }
  async fn mark_order_failed(&self, order_id: Uuid) -> AppResult<()> {
    self.inner.mark_order_failed(order_id).await
  }
  async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
    self.inner.find_order(id).await
  }
  async fn find_order_by_tracking_code(&self, tracking_code: &str) -> AppResult<Option<Order>> {
    self.inner.find_order_by_tracking_code(tracking_code).await
  }
  async fn tracking_code_exists(&self, tracking_code: &str) -> AppResult<bool> {
    self.inner.tracking_code_exists(tracking_code).await
  }
  async fn list_order_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    self.inner.list_order_items(order_id).await
  }
  async fn list_orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
    self.inner.list_orders_for_user(user_id).await
  }
  async fn link_guest_orders(&self, email: &str, user_id: Uuid) -> AppResult<u64> {
    self.inner.link_guest_orders(email, user_id).await
  }
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool> {
    self.inner.update_order_status(order, expected).await
  }
}

/// Catalog where a concurrent buyer takes most of `contested`'s stock right
/// before this request's decrement reaches it.
pub struct ContestedCatalog {
  pub inner: Arc<MemoryStore>,
  pub contested: Uuid,
  pub left_after_race: i32,
}

#[async_trait]
impl CatalogStore for ContestedCatalog {
  async fn find_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
    self.inner.find_products(ids).await
  }
  async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
    self.inner.get_product(id).await
  }
  async fn upsert_product(&self, product: &Product) -> AppResult<()> {
    self.inner.upsert_product(product).await
  }
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<bool> {
    if id == self.contested {
      if let Some(mut product) = self.inner.get_product(id).await? {
        product.stock = self.left_after_race;
        self.inner.upsert_product(&product).await?;
      }
    }
    self.inner.decrement_stock(id, quantity).await
  }
  async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
    self.inner.restock(id, quantity).await
  }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
  async fn send(&self, _email: &Email) -> anyhow::Result<String> {
    anyhow::bail!("smtp relay refused connection")
  }
}

pub fn log_mailer() -> Arc<dyn Mailer> {
  Arc::new(LogMailer)
}
