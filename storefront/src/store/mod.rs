// bazaar/src/store/mod.rs

//! Storage seams for the ordering workflow.
//!
//! Every method is a single atomic operation on its backend. Multi-record
//! consistency across calls is provided by pipeline compensation, not here.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{Order, OrderItem, OrderStatus, Product};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Returns the products that exist among `ids`, in no particular order.
  async fn find_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

  async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;

  async fn upsert_product(&self, product: &Product) -> AppResult<()>;

  /// Decrements stock by `quantity` only if the product is in stock and has
  /// at least `quantity` units. Returns `false` when the condition failed.
  /// Reaching zero clears `in_stock`.
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<bool>;

  /// Adds `quantity` units back and marks the product in stock.
  async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert_order(&self, order: &Order) -> AppResult<()>;

  /// Inserts all items or none.
  async fn insert_order_items(&self, items: &[OrderItem]) -> AppResult<()>;

  async fn delete_order_items(&self, order_id: Uuid) -> AppResult<u64>;

  /// Marks an order `cancelled` with payment `failed`.
  async fn mark_order_failed(&self, order_id: Uuid) -> AppResult<()>;

  async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>>;

  async fn find_order_by_tracking_code(&self, tracking_code: &str) -> AppResult<Option<Order>>;

  async fn tracking_code_exists(&self, tracking_code: &str) -> AppResult<bool>;

  async fn list_order_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>>;

  /// Newest first.
  async fn list_orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

  /// Attaches every still-guest order whose guest email matches `email`
  /// (trimmed, case-insensitive) to `user_id`. Returns the number linked.
  async fn link_guest_orders(&self, email: &str, user_id: Uuid) -> AppResult<u64>;

  /// Persists `order`'s status fields if the stored status is still
  /// `expected`. Returns `false` when another writer got there first.
  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool>;
}

/// Demo catalog used by `SEED_DB=true`.
pub async fn seed_catalog(catalog: &dyn CatalogStore) -> AppResult<Vec<Product>> {
  let products = vec![
    Product::new("Cotton T-Shirt", Decimal::new(45000, 2), 120),
    Product::new("Denim Jacket", Decimal::new(250000, 2), 15),
    Product::new("Leather Wallet", Decimal::new(89900, 2), 40),
    Product::new("Canvas Sneakers", Decimal::new(175000, 2), 0),
  ];
  for product in &products {
    catalog.upsert_product(product).await?;
  }
  tracing::info!(count = products.len(), "Seeded demo catalog.");
  Ok(products)
}

pub(crate) fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}
