// bazaar/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{normalize_email, CatalogStore, OrderStore};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderItem, OrderStatus, PaymentStatus, Product};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, in_stock, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, order_number, tracking_code, user_id, is_guest, guest_email, \
  firstname, lastname, phone, email, house_street, city, subdistrict, postcode, country, \
  shipping_type, pickup_point_id, payment_method, transaction_id, terms_accepted, \
  subtotal, discount, delivery_charge, additional_charge, total_payable, \
  order_status, payment_status, delivered_at, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, product_price, quantity, variant, subtotal, created_at";

/// PostgreSQL backend. Each method issues exactly one statement.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> AppResult<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
    tracing::info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  #[instrument(name = "db::find_products", skip(self), fields(count = ids.len()))]
  async fn find_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    let products = sqlx::query_as::<_, Product>(&sql).bind(ids).fetch_all(&self.pool).await?;
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn upsert_product(&self, product: &Product) -> AppResult<()> {
    sqlx::query(
      "INSERT INTO products (id, name, price, stock, in_stock, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, now()) \
       ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, price = EXCLUDED.price, \
       stock = EXCLUDED.stock, in_stock = EXCLUDED.in_stock, updated_at = now()",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.in_stock)
    .bind(product.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "db::decrement_stock", skip(self))]
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> AppResult<bool> {
    let result = sqlx::query(
      "UPDATE products SET stock = stock - $1, in_stock = (stock - $1) > 0, updated_at = now() \
       WHERE id = $2 AND in_stock AND stock >= $1",
    )
    .bind(quantity)
    .bind(id)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "db::restock", skip(self))]
  async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
    let result =
      sqlx::query("UPDATE products SET stock = stock + $1, in_stock = (stock + $1) > 0, updated_at = now() WHERE id = $2")
        .bind(quantity)
        .bind(id)
        .execute(&self.pool)
        .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("Product {} not found", id)));
    }
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "db::insert_order", skip(self, order), fields(order_number = %order.order_number))]
  async fn insert_order(&self, order: &Order) -> AppResult<()> {
    let sql = format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
       $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30)",
      ORDER_COLUMNS
    );
    sqlx::query(&sql)
      .bind(order.id)
      .bind(&order.order_number)
      .bind(&order.tracking_code)
      .bind(order.user_id)
      .bind(order.is_guest)
      .bind(&order.guest_email)
      .bind(&order.firstname)
      .bind(&order.lastname)
      .bind(&order.phone)
      .bind(&order.email)
      .bind(&order.house_street)
      .bind(&order.city)
      .bind(&order.subdistrict)
      .bind(&order.postcode)
      .bind(&order.country)
      .bind(&order.shipping_type)
      .bind(&order.pickup_point_id)
      .bind(&order.payment_method)
      .bind(&order.transaction_id)
      .bind(order.terms_accepted)
      .bind(order.subtotal)
      .bind(order.discount)
      .bind(order.delivery_charge)
      .bind(order.additional_charge)
      .bind(order.total_payable)
      .bind(order.order_status)
      .bind(order.payment_status)
      .bind(order.delivered_at)
      .bind(order.created_at)
      .bind(order.updated_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(name = "db::insert_order_items", skip(self, items), fields(count = items.len()))]
  async fn insert_order_items(&self, items: &[OrderItem]) -> AppResult<()> {
    if items.is_empty() {
      return Ok(());
    }
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!("INSERT INTO order_items ({}) ", ITEM_COLUMNS));
    builder.push_values(items, |mut row, item| {
      row
        .push_bind(item.id)
        .push_bind(item.order_id)
        .push_bind(item.product_id)
        .push_bind(item.product_name.clone())
        .push_bind(item.product_price)
        .push_bind(item.quantity)
        .push_bind(item.variant.clone())
        .push_bind(item.subtotal)
        .push_bind(item.created_at);
    });
    builder.build().execute(&self.pool).await?;
    Ok(())
  }

  async fn delete_order_items(&self, order_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn mark_order_failed(&self, order_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE orders SET order_status = $1, payment_status = $2, updated_at = now() WHERE id = $3")
      .bind(OrderStatus::Cancelled)
      .bind(PaymentStatus::Failed)
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn find_order_by_tracking_code(&self, tracking_code: &str) -> AppResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE tracking_code = $1", ORDER_COLUMNS);
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(tracking_code)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn tracking_code_exists(&self, tracking_code: &str) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE tracking_code = $1)")
      .bind(tracking_code)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  async fn list_order_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let sql = format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
      ITEM_COLUMNS
    );
    Ok(sqlx::query_as::<_, OrderItem>(&sql).bind(order_id).fetch_all(&self.pool).await?)
  }

  async fn list_orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(&self.pool).await?)
  }

  #[instrument(name = "db::link_guest_orders", skip(self, email))]
  async fn link_guest_orders(&self, email: &str, user_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query(
      "UPDATE orders SET user_id = $1, is_guest = FALSE, updated_at = now() \
       WHERE is_guest AND lower(trim(guest_email)) = $2",
    )
    .bind(user_id)
    .bind(normalize_email(email))
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected())
  }

  async fn update_order_status(&self, order: &Order, expected: OrderStatus) -> AppResult<bool> {
    let result = sqlx::query(
      "UPDATE orders SET order_status = $1, delivered_at = $2, updated_at = $3 \
       WHERE id = $4 AND order_status = $5",
    )
    .bind(order.order_status)
    .bind(order.delivered_at)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(expected)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }
}
