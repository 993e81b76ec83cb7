pub mod difficulty;
pub mod question;

use std::sync::Arc;

use crate::{dao::user_store::StateStore, services::question_resolver::QuestionResolver};

/// Stable identifier of a player, as issued by the chat platform.
pub type UserId = i64;

/// Handle given to every axum handler.
pub type SharedState = Arc<AppState>;

/// Dependencies shared by every request: where questions come from and where
/// per-user state lives. Built once at startup.
pub struct AppState {
    questions: QuestionResolver,
    store: Arc<dyn StateStore>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(questions: QuestionResolver, store: Arc<dyn StateStore>) -> SharedState {
        Arc::new(Self { questions, store })
    }

    /// Ordered question sources.
    pub fn questions(&self) -> &QuestionResolver {
        &self.questions
    }

    /// Per-user state store.
    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }
}
