use std::collections::{BTreeSet, HashMap};

use crate::state::{
    UserId,
    difficulty::{Difficulty, InvalidDifficulty},
    question::Question,
};

use super::AnswerOutcome;

/// In-memory game state for every tracked user, split into one table per field.
///
/// A user without an entry in a table reads as that field's default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTables {
    pub(crate) pending_questions: HashMap<UserId, Question>,
    pub(crate) difficulties: HashMap<UserId, Difficulty>,
    pub(crate) wins: HashMap<UserId, u64>,
    pub(crate) losses: HashMap<UserId, u64>,
}

impl UserTables {
    /// The question awaiting an answer, if any.
    pub fn pending_question(&self, user: UserId) -> Option<Question> {
        self.pending_questions.get(&user).cloned()
    }

    pub fn put_pending_question(&mut self, user: UserId, question: Question) {
        self.pending_questions.insert(user, question);
    }

    /// Keep the current pending question if there is one, otherwise make `question` pending.
    pub fn offer_pending_question(&mut self, user: UserId, question: Question) -> Question {
        self.pending_questions.entry(user).or_insert(question).clone()
    }

    /// Drop the pending question, returning whether there was one.
    pub fn clear_pending_question(&mut self, user: UserId) -> bool {
        self.pending_questions.remove(&user).is_some()
    }

    /// Stored difficulty, [`Difficulty::Easy`] when none was set.
    pub fn difficulty(&self, user: UserId) -> Difficulty {
        self.difficulties.get(&user).copied().unwrap_or_default()
    }

    /// Validate `level` before touching the table so a rejected value leaves it unchanged.
    pub fn set_difficulty(&mut self, user: UserId, level: u8) -> Result<(), InvalidDifficulty> {
        let difficulty = Difficulty::try_from(level)?;
        self.difficulties.insert(user, difficulty);
        Ok(())
    }

    pub fn wins(&self, user: UserId) -> u64 {
        self.wins.get(&user).copied().unwrap_or(0)
    }

    pub fn losses(&self, user: UserId) -> u64 {
        self.losses.get(&user).copied().unwrap_or(0)
    }

    /// Add one win and return the new total.
    pub fn record_win(&mut self, user: UserId) -> u64 {
        let count = self.wins.entry(user).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Add one loss and return the new total.
    pub fn record_loss(&mut self, user: UserId) -> u64 {
        let count = self.losses.entry(user).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Score `reply` against the pending question. A reply naming no option
    /// leaves every table untouched.
    pub fn score_answer(&mut self, user: UserId, reply: &str) -> AnswerOutcome {
        let Some(question) = self.pending_questions.get(&user) else {
            return AnswerOutcome::NoPendingQuestion;
        };
        let Some(option) = question.match_option(reply) else {
            return AnswerOutcome::NotAnOption(question.clone());
        };

        let correct = question.is_correct(option);
        let correct_answer = question.correct_option().to_string();
        self.pending_questions.remove(&user);
        if correct {
            self.record_win(user);
        } else {
            self.record_loss(user);
        }

        AnswerOutcome::Scored {
            correct,
            correct_answer,
        }
    }

    /// Every user id that appears in at least one table.
    pub fn tracked_users(&self) -> BTreeSet<UserId> {
        self.pending_questions
            .keys()
            .chain(self.difficulties.keys())
            .chain(self.wins.keys())
            .chain(self.losses.keys())
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_user_reads_defaults() {
        let tables = UserTables::default();
        assert_eq!(tables.pending_question(7), None);
        assert_eq!(tables.difficulty(7), Difficulty::Easy);
        assert_eq!(tables.wins(7), 0);
        assert_eq!(tables.losses(7), 0);
        assert!(tables.tracked_users().is_empty());
    }

    #[test]
    fn rejected_difficulty_keeps_previous_value() {
        let mut tables = UserTables::default();
        tables.set_difficulty(7, 2).unwrap();
        assert_eq!(tables.set_difficulty(7, 9), Err(InvalidDifficulty(9)));
        assert_eq!(tables.difficulty(7), Difficulty::Medium);
    }

    #[test]
    fn clearing_without_pending_question_is_a_no_op() {
        let mut tables = UserTables::default();
        assert!(!tables.clear_pending_question(7));
        assert_eq!(tables, UserTables::default());
    }

    fn sample_question() -> Question {
        Question::new(
            "2+2?",
            vec!["3".into(), "4".into(), "5".into(), "6".into()],
            "4",
        )
        .unwrap()
    }

    #[test]
    fn scoring_closes_the_question_and_counts_once() {
        let mut tables = UserTables::default();
        tables.put_pending_question(1, sample_question());

        assert_eq!(
            tables.score_answer(1, " 4 "),
            AnswerOutcome::Scored {
                correct: true,
                correct_answer: "4".into(),
            }
        );
        assert_eq!(tables.score_answer(1, "4"), AnswerOutcome::NoPendingQuestion);
        assert_eq!(tables.pending_question(1), None);
        assert_eq!((tables.wins(1), tables.losses(1)), (1, 0));
    }

    #[test]
    fn wrong_option_counts_a_loss() {
        let mut tables = UserTables::default();
        tables.put_pending_question(1, sample_question());

        assert_eq!(
            tables.score_answer(1, "5"),
            AnswerOutcome::Scored {
                correct: false,
                correct_answer: "4".into(),
            }
        );
        assert_eq!((tables.wins(1), tables.losses(1)), (0, 1));
    }

    #[test]
    fn unknown_option_leaves_tables_untouched() {
        let mut tables = UserTables::default();
        tables.put_pending_question(1, sample_question());
        let before = tables.clone();

        assert_eq!(
            tables.score_answer(1, "forty two"),
            AnswerOutcome::NotAnOption(sample_question())
        );
        assert_eq!(tables, before);
    }

    #[test]
    fn offered_question_does_not_replace_pending_one() {
        let mut tables = UserTables::default();
        tables.put_pending_question(1, sample_question());
        let other = Question::new(
            "1+1?",
            vec!["1".into(), "2".into(), "3".into(), "4".into()],
            "2",
        )
        .unwrap();

        assert_eq!(tables.offer_pending_question(1, other.clone()), sample_question());
        assert_eq!(tables.offer_pending_question(2, other.clone()), other);
        assert_eq!(tables.pending_question(2), Some(other));
    }

    #[test]
    fn counters_track_each_user_separately() {
        let mut tables = UserTables::default();
        tables.record_win(1);
        tables.record_win(1);
        tables.record_loss(2);
        assert_eq!(tables.wins(1), 2);
        assert_eq!(tables.losses(1), 0);
        assert_eq!(tables.losses(2), 1);
        assert_eq!(tables.tracked_users().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }
}
