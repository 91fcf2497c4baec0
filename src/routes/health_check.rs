use actix_web::HttpResponse;
use serde_json::json;

/// GET /health_check
///
/// Liveness only; does not touch the stores.
pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(json!({
        "status": "UP",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
