use axum::{Json, Router, routing::get};

use crate::{dto::health::HealthResponse, state::SharedState};

/// Liveness probe; storage and question providers are not contacted.
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/healthcheck", get(healthcheck))
}
