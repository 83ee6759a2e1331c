// bazaar/src/services/mod.rs

pub mod identifiers;
pub mod mailer;
pub mod orders;
pub mod phone;
