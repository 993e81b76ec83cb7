use thiserror::Error;

/// Number of answer options every question carries, one per answer button.
pub const OPTION_COUNT: usize = 4;

/// Reasons a [`Question`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// The option list does not hold exactly [`OPTION_COUNT`] entries.
    #[error("question `{prompt}` has {count} answer options, expected {expected}", expected = OPTION_COUNT)]
    OptionCount { prompt: String, count: usize },
    /// The designated correct answer is not one of the options.
    #[error("answer options of question `{prompt}` do not contain the correct answer `{correct}`")]
    CorrectOptionMissing { prompt: String, correct: String },
}

/// Multiple-choice question shown to a player.
///
/// The correct option is tracked by value, so reordering the options never
/// changes which one is right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Build a question, rejecting it unless there are exactly [`OPTION_COUNT`]
    /// options and `correct_option` is one of them.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_option = correct_option.into();

        if options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                prompt,
                count: options.len(),
            });
        }
        if !options.contains(&correct_option) {
            return Err(QuestionError::CorrectOptionMissing {
                prompt,
                correct: correct_option,
            });
        }

        Ok(Self {
            prompt,
            options,
            correct_option,
        })
    }

    /// Text shown above the answer buttons.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The [`OPTION_COUNT`] options, in display order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The option that wins the round.
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Find the option matching a player's reply, ignoring case and surrounding whitespace.
    pub fn match_option(&self, reply: &str) -> Option<&str> {
        let reply = normalize(reply);
        self.options
            .iter()
            .find(|option| normalize(option) == reply)
            .map(String::as_str)
    }

    /// Whether `option` designates the correct answer, using the same matching as [`Self::match_option`].
    pub fn is_correct(&self, option: &str) -> bool {
        normalize(option) == normalize(&self.correct_option)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
