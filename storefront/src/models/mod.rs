// bazaar/src/models/mod.rs

//! Persisted entities, request bodies and response projections.

pub mod cart;
pub mod checkout;
pub mod order;
pub mod order_item;
pub mod product;
pub mod views;

pub use cart::CartLine;
pub use checkout::CheckoutForm;
pub use order::{Order, OrderStatus, PaymentStatus};
pub use order_item::OrderItem;
pub use product::Product;
pub use views::{OrderDetail, OrderItemView, OrderView, TrackingView};
