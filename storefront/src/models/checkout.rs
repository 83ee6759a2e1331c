// bazaar/src/models/checkout.rs

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::CartLine;

/// Placement request body. Monetary fields are taken as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
  pub items: Vec<CartLine>,

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
  #[serde(rename = "terms")]
  pub terms_accepted: bool,

  pub subtotal: Decimal,
  pub discount: Decimal,
  pub delivery_charge: Decimal,
  pub additional_charge: Decimal,
  pub total_payable: Decimal,
}

impl CheckoutForm {
  /// `subtotal - discount + delivery + additional`, from the submitted figures.
  /// `None` when the figures overflow.
  pub fn expected_total(&self) -> Option<Decimal> {
    self
      .subtotal
      .checked_sub(self.discount)?
      .checked_add(self.delivery_charge)?
      .checked_add(self.additional_charge)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expected_total_combines_submitted_figures() {
    let form = CheckoutForm {
      subtotal: Decimal::from(1000),
      discount: Decimal::from(100),
      delivery_charge: Decimal::from(50),
      additional_charge: Decimal::from(5),
      ..CheckoutForm::default()
    };
    assert_eq!(form.expected_total(), Some(Decimal::from(955)));
  }

  #[test]
  fn expected_total_overflow_is_none() {
    let form = CheckoutForm {
      subtotal: Decimal::MAX,
      delivery_charge: Decimal::ONE,
      ..CheckoutForm::default()
    };
    assert_eq!(form.expected_total(), None);
  }
}
