// bazaar/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers, order_handlers, tracking_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts every route under `/api/v1`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.app_data(
    web::JsonConfig::default().error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
  );
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/guest", web::post().to(order_handlers::place_guest_order_handler))
          .route("/link-guest", web::post().to(order_handlers::link_guest_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .route(
        "/track/{tracking_code}",
        web::get().to(tracking_handlers::track_order_handler),
      )
      .service(web::scope("/admin").route(
        "/orders/{order_id}/status",
        web::patch().to(admin_handlers::update_order_status_handler),
      )),
  );
}
