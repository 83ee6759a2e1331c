// bazaar/src/pipelines/contexts.rs

//! Data carried through pipelines. Handlers receive it wrapped in
//! `bazaar_flow::ContextData`.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{CheckoutForm, Order, OrderItem, Product};
use crate::state::AppState;

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,

  /// `None` for guest placements.
  pub customer_id: Option<Uuid>,
  pub guest: bool,
  pub form: CheckoutForm,

  // Filled by the validation steps.
  /// Requested quantity per product, summed across lines, in first-seen order.
  pub demand: Vec<(Uuid, i32)>,
  pub products: HashMap<Uuid, Product>,
  pub line_total: Decimal,
  pub phone: String,

  pub order_number: Option<String>,
  pub tracking_code: Option<String>,

  // Set only once the corresponding write succeeded.
  pub order: Option<Order>,
  pub items: Vec<OrderItem>,
  pub decremented: Vec<(Uuid, i32)>,

  pub confirmation_id: Option<String>,
}

impl PlaceOrderCtxData {
  fn new(app_state: AppState, customer_id: Option<Uuid>, form: CheckoutForm) -> Self {
    Self {
      app_state,
      guest: customer_id.is_none(),
      customer_id,
      form,
      demand: Vec::new(),
      products: HashMap::new(),
      line_total: Decimal::ZERO,
      phone: String::new(),
      order_number: None,
      tracking_code: None,
      order: None,
      items: Vec::new(),
      decremented: Vec::new(),
      confirmation_id: None,
    }
  }

  pub fn for_customer(app_state: AppState, customer_id: Uuid, form: CheckoutForm) -> Self {
    Self::new(app_state, Some(customer_id), form)
  }

  pub fn for_guest(app_state: AppState, form: CheckoutForm) -> Self {
    Self::new(app_state, None, form)
  }
}
