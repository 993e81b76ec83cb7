use axum::Router;

use crate::state::SharedState;

pub mod actions;
pub mod health;

/// Compose all route trees, wiring in shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router().merge(actions::router()).with_state(state)
}
