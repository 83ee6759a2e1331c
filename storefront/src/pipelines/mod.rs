// bazaar/src/pipelines/mod.rs

//! Pipelines used by the service and their registration.

use crate::errors::AppError;
use bazaar_flow::FlowRegistry;

pub mod contexts;
pub mod place_order_pipeline;

/// Registers every pipeline with `flows`. Called once per `AppState`.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) {
  tracing::info!("Registering pipelines...");
  place_order_pipeline::register_place_order_pipeline(flows);
  tracing::info!("All application pipelines registered.");
}
