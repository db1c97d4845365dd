use std::sync::Arc;

use ad_board_commons::record::{AdRecord, AdSubmission};
use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    database::{Database, InsertOutcome},
    error::ApiError,
};

/// Build the application router. With an `allowed_origin`, browsers on
/// that origin may read the board; without one, no CORS headers are sent.
pub fn app(database: Arc<Database>, allowed_origin: Option<HeaderValue>) -> Router {
    let cors = match allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(origin),
        None => CorsLayer::new(),
    };

    Router::new()
        .route("/", get(index))
        .route("/ads", post(submit_ad).get(list_ads))
        .with_state(database)
        .layer(cors)
}

/// Liveness probe for the hosting platform.
async fn index() -> &'static str {
    "Ad Board backend is running!"
}

/// `POST /ads`: validate, dedup, store.
async fn submit_ad(
    State(database): State<Arc<Database>>,
    Json(submission): Json<AdSubmission>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = submission.validate()?;

    let status = match database.insert_ad(&record).await? {
        InsertOutcome::Inserted => "success",
        InsertOutcome::Duplicate => "duplicate",
    };

    Ok(Json(json!({ "status": status })))
}

/// `GET /ads`: the whole board, most recent first.
async fn list_ads(
    State(database): State<Arc<Database>>,
) -> Result<Json<Vec<AdRecord>>, ApiError> {
    Ok(Json(database.list_ads().await?))
}
