use actix_web::{get, Responder};
use chrono::Utc;
use serde_json::json;

use crate::response::GenericResponse;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    GenericResponse::of(
        json!({
            "status": "ok",
            "timestamp": Utc::now()
        }),
        "Service is healthy",
    )
    .ok()
}
