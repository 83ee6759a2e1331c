// bazaar/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use bazaar::config::{AppConfig, LogFormat};
use bazaar::errors::AppError;
use bazaar::services::mailer::LogMailer;
use bazaar::state::AppState;
use bazaar::store::{self, CatalogStore, MemoryStore, OrderStore, PgStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // LOG_FORMAT has to be known before the subscriber exists; the full config
  // is loaded (and logged) right after.
  dotenvy::dotenv().ok();
  let log_format = std::env::var("LOG_FORMAT")
    .ok()
    .and_then(|v| v.parse::<LogFormat>().ok())
    .unwrap_or(LogFormat::Pretty);
  bazaar::telemetry::init_tracing(log_format);

  tracing::info!("Starting bazaar order service...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;

  let (catalog, orders) = open_stores(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise storage.");
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
  })?;

  if app_config.seed_db {
    if let Err(e) = store::seed_catalog(catalog.as_ref()).await {
      tracing::error!(error = %e, "Failed to seed catalog.");
    }
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(app_config, catalog, orders, Arc::new(LogMailer));

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(bazaar::web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}

async fn open_stores(config: &AppConfig) -> Result<(Arc<dyn CatalogStore>, Arc<dyn OrderStore>), AppError> {
  let Some(database_url) = config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on exit.");
    let memory = Arc::new(MemoryStore::new());
    let catalog: Arc<dyn CatalogStore> = memory.clone();
    let orders: Arc<dyn OrderStore> = memory;
    return Ok((catalog, orders));
  };

  let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
  tracing::info!("Connected to the database.");
  let pg = Arc::new(PgStore::new(pool));
  if config.run_migrations {
    pg.migrate().await?;
  }
  let catalog: Arc<dyn CatalogStore> = pg.clone();
  let orders: Arc<dyn OrderStore> = pg;
  Ok((catalog, orders))
}
