use axum::response::Json;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Spotify proxy API is running"
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "API is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
