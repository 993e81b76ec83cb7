use serde::Serialize;

use crate::state::question::Question;

/// Introduction sent on start, on help requests and for unrecognized text.
pub const WELCOME_TEXT: &str = "This is a \"Who wants to be a millionaire\" quiz bot. \
Ask me for a question to play, or ask for your score to see your wins and losses. \
Change the difficulty with \"Difficulty 1\", \"Difficulty 2\" or \"Difficulty 3\"!";
/// Generic notice shown when something failed internally.
pub const INTERNAL_ERROR_TEXT: &str = "Something is wrong with me... Try telling me something else";
/// Prefix shown when a question is repeated because it is still unanswered.
pub const UNANSWERED_NOTICE: &str =
    "You have not answered the previous question yet. Here it is again!";
/// Prefix shown when the reply does not match any option of the pending question.
pub const NOT_AN_OPTION_NOTICE: &str = "You are not answering the latest question! \
I could count it as a wrong answer, but maybe you will answer properly?";

/// Reply handed back to the chat front end for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Rules of the game and the available commands.
    Welcome {
        text: String,
    },
    /// Answer to a "hello".
    Greeting,
    /// Confirms the level questions will now be asked at.
    DifficultyChanged {
        level: u8,
    },
    /// A question to display with one button per option.
    Question {
        prompt: String,
        options: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<String>,
    },
    /// Win/loss tally of the player.
    Score {
        wins: u64,
        losses: u64,
    },
    /// Outcome of an answer; the correct answer is revealed only after a miss.
    Verdict {
        correct: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        correct_answer: Option<String>,
    },
    /// An answer arrived while no question was pending.
    AlreadyAnswered,
    /// Free text arrived while a question is waiting for a button press.
    PressAnswerButton,
    /// Generic apology; the cause is only logged.
    InternalError {
        message: String,
    },
}

impl Reply {
    /// [`Reply::Welcome`] with [`WELCOME_TEXT`].
    pub fn welcome() -> Self {
        Reply::Welcome {
            text: WELCOME_TEXT.to_string(),
        }
    }

    /// [`Reply::InternalError`] with [`INTERNAL_ERROR_TEXT`].
    pub fn internal_error() -> Self {
        Reply::InternalError {
            message: INTERNAL_ERROR_TEXT.to_string(),
        }
    }

    /// Present `question`, optionally prefixed by a notice.
    pub fn question(question: &Question, notice: Option<&str>) -> Self {
        Reply::Question {
            prompt: question.prompt().to_string(),
            options: question.options().to_vec(),
            notice: notice.map(str::to_string),
        }
    }
}
