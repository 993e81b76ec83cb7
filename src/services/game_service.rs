use tracing::info;

use crate::{
    dao::user_store::AnswerOutcome,
    dto::{
        action::Action,
        reply::{NOT_AN_OPTION_NOTICE, Reply, UNANSWERED_NOTICE},
    },
    error::ServiceError,
    state::{SharedState, UserId},
};

/// Apply one player action to the game state and produce the reply to show.
pub async fn handle_action(
    state: &SharedState,
    user: UserId,
    action: Action,
) -> Result<Reply, ServiceError> {
    match action {
        Action::Start | Action::Help => Ok(Reply::welcome()),
        Action::Greeting => Ok(Reply::Greeting),
        Action::SetDifficulty { level } => set_difficulty(state, user, level).await,
        Action::AskQuestion => ask_question(state, user).await,
        Action::ShowScore => show_score(state, user).await,
        Action::Answer { text } => answer(state, user, text).await,
        Action::Text { .. } => free_text(state, user).await,
    }
}

async fn set_difficulty(state: &SharedState, user: UserId, level: u8) -> Result<Reply, ServiceError> {
    state.store().set_difficulty(user, level).await?;
    info!(user, level, "difficulty changed");
    Ok(Reply::DifficultyChanged { level })
}

/// Serve a new question, or repeat the pending one so a player cannot skip it.
async fn ask_question(state: &SharedState, user: UserId) -> Result<Reply, ServiceError> {
    let store = state.store();
    if let Some(pending) = store.pending_question(user).await? {
        return Ok(Reply::question(&pending, Some(UNANSWERED_NOTICE)));
    }

    let difficulty = store.difficulty(user).await?;
    let question = state.questions().resolve(difficulty).await?;
    // A concurrent request may have set a question while this one was resolving.
    let pending = store.offer_pending_question(user, question).await?;

    Ok(Reply::question(&pending, None))
}

async fn show_score(state: &SharedState, user: UserId) -> Result<Reply, ServiceError> {
    let store = state.store();
    let wins = store.wins(user).await?;
    let losses = store.losses(user).await?;
    Ok(Reply::Score { wins, losses })
}

/// Score an answer against the pending question and close it.
async fn answer(state: &SharedState, user: UserId, text: String) -> Result<Reply, ServiceError> {
    match state.store().score_answer(user, text).await? {
        AnswerOutcome::NoPendingQuestion => Ok(Reply::AlreadyAnswered),
        AnswerOutcome::NotAnOption(question) => {
            Ok(Reply::question(&question, Some(NOT_AN_OPTION_NOTICE)))
        }
        AnswerOutcome::Scored {
            correct,
            correct_answer,
        } => {
            info!(user, correct, "answer recorded");
            Ok(Reply::Verdict {
                correct,
                correct_answer: (!correct).then_some(correct_answer),
            })
        }
    }
}

async fn free_text(state: &SharedState, user: UserId) -> Result<Reply, ServiceError> {
    if state.store().pending_question(user).await?.is_some() {
        Ok(Reply::PressAnswerButton)
    } else {
        Ok(Reply::welcome())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{
            question_source::{QuestionSource, SourceError, StaticQuestionSource},
            user_store::{MemoryStateStore, StateStore},
        },
        services::question_resolver::QuestionResolver,
        state::{AppState, difficulty::Difficulty, question::Question},
    };

    struct Offline;

    impl QuestionSource for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn fetch(&self, _difficulty: Difficulty) -> BoxFuture<'static, Result<Question, SourceError>> {
            Box::pin(async { Err::<Question, _>(SourceError::Status { status: 503 }) })
        }
    }

    /// Serves a different question on every fetch.
    #[derive(Default)]
    struct Numbered(AtomicUsize);

    impl QuestionSource for Numbered {
        fn name(&self) -> &str {
            "numbered"
        }

        fn fetch(&self, _difficulty: Difficulty) -> BoxFuture<'static, Result<Question, SourceError>> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::task::yield_now().await;
                Ok::<_, SourceError>(
                    Question::new(
                        format!("Question {n}"),
                        vec!["a".into(), "b".into(), "c".into(), "d".into()],
                        "a",
                    )
                    .unwrap(),
                )
            })
        }
    }

    fn arithmetic() -> Question {
        Question::new(
            "2+2?",
            vec!["3".into(), "4".into(), "5".into(), "6".into()],
            "4",
        )
        .unwrap()
    }

    fn app_with(sources: Vec<Arc<dyn QuestionSource>>) -> (SharedState, MemoryStateStore) {
        let store = MemoryStateStore::new();
        let resolver = QuestionResolver::new(sources).unwrap();
        (AppState::new(resolver, Arc::new(store.clone())), store)
    }

    fn app() -> (SharedState, MemoryStateStore) {
        let source = StaticQuestionSource::new(vec![arithmetic()]).unwrap();
        app_with(vec![Arc::new(source)])
    }

    #[tokio::test]
    async fn correct_answer_records_win_and_clears_question() {
        let (state, store) = app();
        store.put_pending_question(42, arithmetic()).await.unwrap();

        let reply = handle_action(&state, 42, Action::Answer { text: "4".into() })
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::Verdict {
                correct: true,
                correct_answer: None
            }
        );
        assert_eq!(store.wins(42).await.unwrap(), 1);
        assert_eq!(store.losses(42).await.unwrap(), 0);
        assert_eq!(store.pending_question(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn wrong_answer_records_loss_and_reveals_answer() {
        let (state, store) = app();
        store.put_pending_question(42, arithmetic()).await.unwrap();

        let reply = handle_action(&state, 42, Action::Answer { text: "3".into() })
            .await
            .unwrap();

        assert_eq!(
            reply,
            Reply::Verdict {
                correct: false,
                correct_answer: Some("4".into())
            }
        );
        assert_eq!(store.losses(42).await.unwrap(), 1);
        assert_eq!(store.wins(42).await.unwrap(), 0);
        assert_eq!(store.pending_question(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_option_repeats_question_without_scoring() {
        let (state, store) = app();
        store.put_pending_question(42, arithmetic()).await.unwrap();

        let reply = handle_action(&state, 42, Action::Answer { text: "22".into() })
            .await
            .unwrap();

        assert_eq!(reply, Reply::question(&arithmetic(), Some(NOT_AN_OPTION_NOTICE)));
        assert_eq!(store.pending_question(42).await.unwrap(), Some(arithmetic()));
        assert_eq!(store.wins(42).await.unwrap() + store.losses(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn answer_without_pending_question_is_rejected() {
        let (state, _store) = app();
        let reply = handle_action(&state, 42, Action::Answer { text: "4".into() })
            .await
            .unwrap();
        assert_eq!(reply, Reply::AlreadyAnswered);
    }

    #[tokio::test]
    async fn asking_twice_repeats_the_pending_question() {
        let (state, store) = app();

        let first = handle_action(&state, 7, Action::AskQuestion).await.unwrap();
        assert_eq!(first, Reply::question(&arithmetic(), None));
        assert_eq!(store.pending_question(7).await.unwrap(), Some(arithmetic()));

        let second = handle_action(&state, 7, Action::AskQuestion).await.unwrap();
        assert_eq!(second, Reply::question(&arithmetic(), Some(UNANSWERED_NOTICE)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_asks_agree_on_one_pending_question() {
        let (state, store) = app_with(vec![Arc::new(Numbered::default())]);

        for user in 0..20 {
            let handles = (0..2)
                .map(|_| {
                    let state = state.clone();
                    tokio::spawn(async move { handle_action(&state, user, Action::AskQuestion).await })
                })
                .collect::<Vec<_>>();

            let mut prompts = Vec::new();
            for handle in handles {
                match handle.await.unwrap().unwrap() {
                    Reply::Question { prompt, .. } => prompts.push(prompt),
                    other => panic!("unexpected reply: {other:?}"),
                }
            }

            let pending = store.pending_question(user).await.unwrap().unwrap();
            assert!(prompts.iter().all(|prompt| prompt == pending.prompt()), "user {user}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_answers_are_scored_once() {
        let (state, store) = app();
        for user in 0..100 {
            store.put_pending_question(user, arithmetic()).await.unwrap();
        }

        let mut handles = Vec::new();
        for user in 0..100 {
            for text in ["4", "3"] {
                let state = state.clone();
                let action = Action::Answer { text: text.into() };
                handles.push(tokio::spawn(async move { handle_action(&state, user, action).await }));
            }
        }
        let mut verdicts = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                Reply::Verdict { .. } => verdicts += 1,
                Reply::AlreadyAnswered => {}
                other => panic!("unexpected reply: {other:?}"),
            }
        }

        assert_eq!(verdicts, 100);
        for user in 0..100 {
            let total = store.wins(user).await.unwrap() + store.losses(user).await.unwrap();
            assert_eq!(total, 1, "user {user}");
            assert_eq!(store.pending_question(user).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn difficulty_and_score_round_trip_through_store() {
        let (state, store) = app();

        let reply = handle_action(&state, 7, Action::SetDifficulty { level: 3 })
            .await
            .unwrap();
        assert_eq!(reply, Reply::DifficultyChanged { level: 3 });
        assert_eq!(store.difficulty(7).await.unwrap(), Difficulty::Hard);

        store.record_win(7).await.unwrap();
        let reply = handle_action(&state, 7, Action::ShowScore).await.unwrap();
        assert_eq!(reply, Reply::Score { wins: 1, losses: 0 });
    }

    #[tokio::test]
    async fn invalid_difficulty_is_invalid_input() {
        let (state, store) = app();
        let err = handle_action(&state, 7, Action::SetDifficulty { level: 9 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(store.difficulty(7).await.unwrap(), Difficulty::Easy);
    }

    #[tokio::test]
    async fn free_text_depends_on_pending_question() {
        let (state, store) = app();
        let text = || Action::Text { text: "hi there".into() };

        assert_eq!(handle_action(&state, 7, text()).await.unwrap(), Reply::welcome());

        store.put_pending_question(7, arithmetic()).await.unwrap();
        assert_eq!(
            handle_action(&state, 7, text()).await.unwrap(),
            Reply::PressAnswerButton
        );
    }

    #[tokio::test]
    async fn exhausted_sources_fail_the_turn_without_pending_question() {
        let (state, store) = app_with(vec![Arc::new(Offline)]);

        let err = handle_action(&state, 7, Action::AskQuestion).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoQuestion(_)));
        assert_eq!(store.pending_question(7).await.unwrap(), None);
    }
}
