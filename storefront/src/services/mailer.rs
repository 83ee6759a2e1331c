// bazaar/src/services/mailer.rs

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body: String,
}

/// Outbound mail. Delivery failures are reported, never retried here.
#[async_trait]
pub trait Mailer: Send + Sync {
  /// Returns a provider message id.
  async fn send(&self, email: &Email) -> anyhow::Result<String>;
}

/// Writes mail to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
  async fn send(&self, email: &Email) -> anyhow::Result<String> {
    let message_id = format!("log_{}", Uuid::new_v4().simple());
    let body_preview: String = email.body.chars().take(60).collect();
    info!(
      to = %email.to,
      from = %email.from,
      subject = %email.subject,
      %body_preview,
      %message_id,
      "Email recorded by log mailer."
    );
    Ok(message_id)
  }
}

pub fn order_confirmation(order: &Order, items: &[OrderItem], sender: &str) -> Email {
  let mut body = format!(
    "Hi {},\n\nThanks for your order {}. Track it with code {}.\n\n",
    order.firstname, order.order_number, order.tracking_code
  );
  for item in items {
    body.push_str(&format!("  {} x {} = {}\n", item.quantity, item.product_name, item.subtotal));
  }
  body.push_str(&format!("\nTotal payable: {}\n", order.total_payable));
  Email {
    to: order.email.clone(),
    from: sender.to_string(),
    subject: format!("Order {} received", order.order_number),
    body,
  }
}
