use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_player_text;

/// Normalized player action handed over by the chat front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// `/start` or first contact.
    Start,
    /// "How do I play?" request.
    Help,
    Greeting,
    /// Choose the difficulty of the next questions.
    SetDifficulty { level: u8 },
    /// Ask for a new question.
    AskQuestion,
    ShowScore,
    /// Player pressed one of the answer buttons.
    Answer { text: String },
    /// Free text that matched no other command.
    Text { text: String },
}

impl Validate for Action {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Action::Answer { text } | Action::Text { text } = self {
            if let Err(e) = validate_player_text(text) {
                errors.add("text", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
