use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{action::Action, reply::Reply},
    error::AppError,
    services::game_service,
    state::{SharedState, UserId},
};

/// Routes receiving normalized player actions from the chat front end.
pub fn router() -> Router<SharedState> {
    Router::new().route("/users/{user_id}/actions", post(submit_action))
}

/// Apply one action for `user_id` and return the reply to render.
pub async fn submit_action(
    State(state): State<SharedState>,
    Path(user_id): Path<UserId>,
    Json(action): Json<Action>,
) -> Result<Json<Reply>, AppError> {
    action.validate()?;
    let reply = game_service::handle_action(&state, user_id, action).await?;
    Ok(Json(reply))
}
