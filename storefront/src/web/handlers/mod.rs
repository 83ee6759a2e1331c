// bazaar/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod order_handlers;
pub mod tracking_handlers;
