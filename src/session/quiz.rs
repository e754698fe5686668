use std::sync::Arc;

use thiserror::Error;

use crate::content::{ContentStore, Difficulty, QuizQuestion};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizState {
    LectureSelect,
    DifficultySelect,
    /// No questions exist for the chosen (lecture, difficulty).
    Empty,
    Answering,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("lecture {0} does not exist")]
    UnknownLecture(u32),
    #[error("cannot {op} while in {state:?}")]
    NotAllowed { op: &'static str, state: QuizState },
    #[error("answer already submitted")]
    AlreadySubmitted,
    #[error("select an option first")]
    NothingSelected,
    #[error("option {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("already at the last question")]
    LastQuestion,
    #[error("submit an answer before moving on")]
    NotSubmitted,
}

/// Lecture → difficulty → question-by-question quiz flow.
///
/// Every operation either performs its transition or returns an error and
/// leaves the engine untouched.
pub struct QuizEngine {
    content: Arc<ContentStore>,
    lecture_id: Option<u32>,
    difficulty: Option<Difficulty>,
    pool: Vec<QuizQuestion>,
    index: usize,
    selected: Option<usize>,
    submitted: bool,
    score: usize,
}

impl QuizEngine {
    pub fn new(content: Arc<ContentStore>) -> Self {
        Self {
            content,
            lecture_id: None,
            difficulty: None,
            pool: Vec::new(),
            index: 0,
            selected: None,
            submitted: false,
            score: 0,
        }
    }

    pub fn state(&self) -> QuizState {
        if self.lecture_id.is_none() {
            QuizState::LectureSelect
        } else if self.difficulty.is_none() {
            QuizState::DifficultySelect
        } else if self.pool.is_empty() {
            QuizState::Empty
        } else if self.submitted && self.is_last_question() {
            QuizState::Completed
        } else {
            QuizState::Answering
        }
    }

    pub fn lecture_id(&self) -> Option<u32> {
        self.lecture_id
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.pool.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.pool.len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 >= self.pool.len()
    }

    /// Whether the submitted answer was right. `None` before submitting.
    pub fn last_answer_correct(&self) -> Option<bool> {
        if !self.submitted {
            return None;
        }
        let question = self.current_question()?;
        Some(self.selected == Some(question.correct_answer))
    }

    /// `(score, total)` once the last question has been submitted.
    pub fn result(&self) -> Option<(usize, usize)> {
        (self.state() == QuizState::Completed).then_some((self.score, self.pool.len()))
    }

    /// Pool size for a difficulty of the chosen lecture.
    pub fn question_count(&self, difficulty: Difficulty) -> usize {
        self.lecture_id
            .map(|id| {
                self.content
                    .lecture_questions(id)
                    .filter(|q| q.difficulty == difficulty)
                    .count()
            })
            .unwrap_or(0)
    }

    fn require(&self, op: &'static str, allowed: &[QuizState]) -> Result<(), QuizError> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            tracing::debug!(op, ?state, "quiz transition rejected");
            Err(QuizError::NotAllowed { op, state })
        }
    }

    fn reset_progress(&mut self) {
        self.index = 0;
        self.selected = None;
        self.submitted = false;
        self.score = 0;
    }

    pub fn choose_lecture(&mut self, lecture_id: u32) -> Result<(), QuizError> {
        self.require("choose a lecture", &[QuizState::LectureSelect])?;
        if self.content.lecture(lecture_id).is_none() {
            return Err(QuizError::UnknownLecture(lecture_id));
        }
        self.lecture_id = Some(lecture_id);
        Ok(())
    }

    pub fn choose_difficulty(&mut self, difficulty: Difficulty) -> Result<QuizState, QuizError> {
        self.require("choose a difficulty", &[QuizState::DifficultySelect])?;
        let Some(lecture_id) = self.lecture_id else {
            return Err(QuizError::NotAllowed {
                op: "choose a difficulty",
                state: QuizState::LectureSelect,
            });
        };
        self.pool = self.content.questions(lecture_id, difficulty);
        self.difficulty = Some(difficulty);
        self.reset_progress();
        tracing::debug!(lecture_id, difficulty = difficulty.as_str(), questions = self.pool.len(), "quiz started");
        Ok(self.state())
    }

    pub fn select_option(&mut self, index: usize) -> Result<(), QuizError> {
        self.require("select an option", &[QuizState::Answering])?;
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        let len = self.current_question().map_or(0, |q| q.options.len());
        if index >= len {
            return Err(QuizError::OptionOutOfRange { index, len });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Lock in the selected option. Returns whether it was correct.
    pub fn submit(&mut self) -> Result<bool, QuizError> {
        self.require("submit", &[QuizState::Answering])?;
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        let Some(selected) = self.selected else {
            return Err(QuizError::NothingSelected);
        };
        let correct = self
            .current_question()
            .is_some_and(|q| q.correct_answer == selected);
        if correct {
            self.score += 1;
        }
        self.submitted = true;
        Ok(correct)
    }

    pub fn next_question(&mut self) -> Result<(), QuizError> {
        self.require("advance", &[QuizState::Answering])?;
        if !self.submitted {
            return Err(QuizError::NotSubmitted);
        }
        if self.is_last_question() {
            return Err(QuizError::LastQuestion);
        }
        self.index += 1;
        self.selected = None;
        self.submitted = false;
        Ok(())
    }

    pub fn restart_same_difficulty(&mut self) -> Result<(), QuizError> {
        self.require("restart", &[QuizState::Answering, QuizState::Completed])?;
        self.reset_progress();
        Ok(())
    }

    pub fn change_difficulty(&mut self) -> Result<(), QuizError> {
        self.require(
            "change difficulty",
            &[QuizState::Answering, QuizState::Completed, QuizState::Empty],
        )?;
        self.difficulty = None;
        self.pool.clear();
        self.reset_progress();
        Ok(())
    }

    pub fn back_to_lectures(&mut self) -> Result<(), QuizError> {
        self.require("go back", &[QuizState::DifficultySelect])?;
        self.lecture_id = None;
        Ok(())
    }

    /// Abandon everything and return to lecture selection. Always allowed.
    pub fn change_lecture(&mut self) {
        self.lecture_id = None;
        self.difficulty = None;
        self.pool.clear();
        self.reset_progress();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::{lecture, question};

    fn engine() -> QuizEngine {
        let content = ContentStore::from_parts(
            vec![lecture(1, Vec::new()), lecture(2, Vec::new())],
            vec![
                question(1, Difficulty::Easy, 0),
                question(1, Difficulty::Easy, 2),
                question(1, Difficulty::Medium, 1),
                question(2, Difficulty::Easy, 3),
            ],
        );
        QuizEngine::new(Arc::new(content))
    }

    fn started(difficulty: Difficulty) -> QuizEngine {
        let mut quiz = engine();
        quiz.choose_lecture(1).unwrap();
        quiz.choose_difficulty(difficulty).unwrap();
        quiz
    }

    #[test]
    fn unknown_lecture_is_rejected() {
        let mut quiz = engine();
        assert_eq!(quiz.choose_lecture(9), Err(QuizError::UnknownLecture(9)));
        assert_eq!(quiz.state(), QuizState::LectureSelect);
    }

    #[test]
    fn pool_is_lecture_filtered_by_difficulty() {
        let quiz = started(Difficulty::Easy);
        assert_eq!(quiz.total(), 2);
        assert_eq!(quiz.question_count(Difficulty::Medium), 1);
        assert_eq!(quiz.question_count(Difficulty::Expert), 0);
    }

    #[test]
    fn empty_pool_only_exits_via_change_difficulty() {
        let mut quiz = started(Difficulty::Expert);
        assert_eq!(quiz.state(), QuizState::Empty);
        assert!(quiz.select_option(0).is_err());
        assert!(quiz.submit().is_err());
        assert!(quiz.next_question().is_err());
        assert!(matches!(
            quiz.restart_same_difficulty(),
            Err(QuizError::NotAllowed { .. })
        ));
        assert_eq!(quiz.state(), QuizState::Empty);
        quiz.change_difficulty().unwrap();
        assert_eq!(quiz.state(), QuizState::DifficultySelect);
    }

    #[test]
    fn submit_requires_selection_and_happens_once() {
        let mut quiz = started(Difficulty::Easy);
        assert_eq!(quiz.submit(), Err(QuizError::NothingSelected));
        assert_eq!(
            quiz.select_option(7),
            Err(QuizError::OptionOutOfRange { index: 7, len: 4 })
        );
        quiz.select_option(0).unwrap();
        assert_eq!(quiz.submit(), Ok(true));
        assert_eq!(quiz.submit(), Err(QuizError::AlreadySubmitted));
        assert_eq!(quiz.select_option(1), Err(QuizError::AlreadySubmitted));
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn next_requires_submission() {
        let mut quiz = started(Difficulty::Easy);
        assert_eq!(quiz.next_question(), Err(QuizError::NotSubmitted));
        quiz.select_option(1).unwrap();
        assert_eq!(quiz.submit(), Ok(false));
        quiz.next_question().unwrap();
        assert_eq!(quiz.index(), 1);
        assert_eq!(quiz.selected(), None);
        assert!(!quiz.is_submitted());
    }

    #[test]
    fn last_submission_completes_with_score() {
        let mut quiz = started(Difficulty::Easy);
        quiz.select_option(0).unwrap();
        quiz.submit().unwrap();
        quiz.next_question().unwrap();
        quiz.select_option(2).unwrap();
        quiz.submit().unwrap();
        assert_eq!(quiz.state(), QuizState::Completed);
        assert_eq!(quiz.result(), Some((2, 2)));
        assert!(matches!(
            quiz.next_question(),
            Err(QuizError::NotAllowed { .. })
        ));
    }

    #[test]
    fn score_is_bounded_by_answers() {
        let mut quiz = started(Difficulty::Easy);
        let mut answered = 0;
        let mut correct = 0;
        loop {
            quiz.select_option(3).unwrap();
            if quiz.submit().unwrap() {
                correct += 1;
            }
            answered += 1;
            assert!(quiz.score() <= answered);
            assert_eq!(quiz.score(), correct);
            if quiz.next_question().is_err() {
                break;
            }
        }
        assert_eq!(quiz.result(), Some((0, 2)));
    }

    #[test]
    fn restart_keeps_lecture_and_difficulty() {
        let mut quiz = started(Difficulty::Easy);
        quiz.select_option(0).unwrap();
        quiz.submit().unwrap();
        quiz.restart_same_difficulty().unwrap();
        assert_eq!(quiz.state(), QuizState::Answering);
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.index(), 0);
        assert_eq!(quiz.lecture_id(), Some(1));
        assert_eq!(quiz.difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn navigation_back_to_lectures() {
        let mut quiz = engine();
        quiz.choose_lecture(2).unwrap();
        quiz.back_to_lectures().unwrap();
        assert_eq!(quiz.state(), QuizState::LectureSelect);

        let mut quiz = started(Difficulty::Medium);
        quiz.change_lecture();
        assert_eq!(quiz.state(), QuizState::LectureSelect);
        assert_eq!(quiz.total(), 0);
    }
}
