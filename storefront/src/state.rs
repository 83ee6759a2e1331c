// bazaar/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::mailer::{LogMailer, Mailer};
use crate::store::{CatalogStore, MemoryStore, OrderStore};
use bazaar_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogStore>,
  pub orders: Arc<dyn OrderStore>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub mailer: Arc<dyn Mailer>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every pipeline on a fresh registry.
  pub fn new(
    config: AppConfig,
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    mailer: Arc<dyn Mailer>,
  ) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      catalog,
      orders,
      flows,
      mailer,
      config: Arc::new(config),
    }
  }

  /// One in-memory store behind both seams, logging mailer.
  pub fn in_memory(config: AppConfig, store: Arc<MemoryStore>) -> Self {
    Self::new(config, store.clone(), store, Arc::new(LogMailer))
  }
}
