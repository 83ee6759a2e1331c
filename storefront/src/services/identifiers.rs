// bazaar/src/services/identifiers.rs

//! Order numbers and tracking codes.
//!
//! * Order number: `ORD-<unix-ms>-<8 uppercase hex chars of a v4 UUID>`.
//! * Tracking code: `<YYYYMMDD, UTC><5 digits>`, 13 digits in total. The
//!   random part is small, so uniqueness is checked against the order store.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::store::OrderStore;

pub const TRACKING_CODE_LEN: usize = 13;

pub fn generate_order_number() -> String {
  order_number_at(Utc::now())
}

pub fn order_number_at(now: DateTime<Utc>) -> String {
  let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
  format!("ORD-{}-{}", now.timestamp_millis(), suffix)
}

pub fn generate_tracking_code() -> String {
  tracking_code_at(Utc::now(), &mut rand::thread_rng())
}

pub fn tracking_code_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
  format!("{}{:05}", now.format("%Y%m%d"), rng.gen_range(0..100_000u32))
}

pub fn is_tracking_code(candidate: &str) -> bool {
  candidate.len() == TRACKING_CODE_LEN && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Draws tracking codes until one is unused, giving up after `attempts`.
#[instrument(name = "identifiers::allocate_tracking_code", skip(orders))]
pub async fn allocate_tracking_code(orders: &dyn OrderStore, attempts: u32) -> AppResult<String> {
  for attempt in 1..=attempts.max(1) {
    let candidate = generate_tracking_code();
    if !orders.tracking_code_exists(&candidate).await? {
      debug!(attempt, tracking_code = %candidate, "Tracking code allocated.");
      return Ok(candidate);
    }
    warn!(attempt, tracking_code = %candidate, "Tracking code already taken, drawing again.");
  }
  Err(AppError::Internal(format!(
    "Could not allocate a free tracking code after {} attempts",
    attempts
  )))
}
