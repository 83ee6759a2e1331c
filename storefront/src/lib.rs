// bazaar/src/lib.rs

//! Order placement service: carts are validated against live stock, turned
//! into orders with line-item snapshots, and stock is decremented, all as one
//! compensating `bazaar_flow` pipeline.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod web;
