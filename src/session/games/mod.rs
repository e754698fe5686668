pub mod matching;
pub mod scramble;
pub mod sequencing;
pub mod sorting;
pub mod true_false;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::content::{GlossaryEntry, LectureRecord};
use crate::engine::scoring::ScoreBoard;

pub use matching::Matching;
pub use scramble::Scramble;
pub use sequencing::Sequencing;
pub use sorting::Sorting;
pub use true_false::TrueFalse;

/// Lecture whose glossary covers the id / ego / superego model.
pub const SORTING_LECTURE: u32 = 1;
/// Lecture covering Maslow's hierarchy.
pub const SEQUENCING_LECTURE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameMode {
    Matching,
    TrueFalse,
    Sorting,
    Sequencing,
    Scramble,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Matching,
        GameMode::TrueFalse,
        GameMode::Sorting,
        GameMode::Sequencing,
        GameMode::Scramble,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Matching => "Term Matching",
            GameMode::TrueFalse => "True or False",
            GameMode::Sorting => "Psyche Sorting",
            GameMode::Sequencing => "Maslow's Pyramid",
            GameMode::Scramble => "Term Scramble",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameMode::Matching => "Pair each term with its meaning",
            GameMode::TrueFalse => "Judge each statement before time runs out",
            GameMode::Sorting => "File each trait under id, ego or superego",
            GameMode::Sequencing => "Build the hierarchy of needs from the base up",
            GameMode::Scramble => "Unscramble a glossary term from its hint",
        }
    }

    pub fn is_available(self, lecture: &LectureRecord) -> bool {
        match self {
            GameMode::Matching | GameMode::TrueFalse | GameMode::Scramble => {
                !lecture.glossary.is_empty()
            }
            GameMode::Sorting => lecture.id == SORTING_LECTURE,
            GameMode::Sequencing => lecture.id == SEQUENCING_LECTURE,
        }
    }

    pub fn available_for(lecture: &LectureRecord) -> Vec<GameMode> {
        Self::ALL
            .into_iter()
            .filter(|m| m.is_available(lecture))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameAction {
    /// Pick a card or pool item by index.
    Select(usize),
    Answer(bool),
    /// One second of game time.
    Tick,
    /// Put the current sorting item into a category.
    Assign(usize),
    Guess(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The action does not apply in the current state.
    Ignored,
    /// Accepted without scoring.
    Progress,
    Correct,
    Wrong,
}

pub trait MiniGame {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome;
    fn is_won(&self) -> bool;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("{} is not offered for lecture {lecture}", mode.label())]
    Unavailable { mode: GameMode, lecture: u32 },
}

pub enum GameBoard {
    Matching(Matching),
    TrueFalse(TrueFalse),
    Sorting(Sorting),
    Sequencing(Sequencing),
    Scramble(Scramble),
}

impl GameBoard {
    fn build(mode: GameMode, entries: &[GlossaryEntry], rng: &mut SmallRng) -> Self {
        match mode {
            GameMode::Matching => GameBoard::Matching(Matching::new(entries, rng)),
            GameMode::TrueFalse => GameBoard::TrueFalse(TrueFalse::new(entries, rng)),
            GameMode::Sorting => GameBoard::Sorting(Sorting::new(rng)),
            GameMode::Sequencing => GameBoard::Sequencing(Sequencing::new(rng)),
            GameMode::Scramble => GameBoard::Scramble(Scramble::new(entries, rng)),
        }
    }

    fn game_mut(&mut self) -> &mut dyn MiniGame {
        match self {
            GameBoard::Matching(g) => g,
            GameBoard::TrueFalse(g) => g,
            GameBoard::Sorting(g) => g,
            GameBoard::Sequencing(g) => g,
            GameBoard::Scramble(g) => g,
        }
    }

    fn game(&self) -> &dyn MiniGame {
        match self {
            GameBoard::Matching(g) => g,
            GameBoard::TrueFalse(g) => g,
            GameBoard::Sorting(g) => g,
            GameBoard::Sequencing(g) => g,
            GameBoard::Scramble(g) => g,
        }
    }
}

/// One play-through of a mini-game, from start (or restart) to win or exit.
pub struct GameSession {
    lecture_id: u32,
    mode: GameMode,
    entries: Vec<GlossaryEntry>,
    board: GameBoard,
    score: ScoreBoard,
    won: bool,
    rng: SmallRng,
}

impl GameSession {
    pub fn start(lecture: &LectureRecord, mode: GameMode) -> Result<Self, GameError> {
        Self::start_with_rng(lecture, mode, SmallRng::from_entropy())
    }

    pub fn start_with_rng(
        lecture: &LectureRecord,
        mode: GameMode,
        mut rng: SmallRng,
    ) -> Result<Self, GameError> {
        if !mode.is_available(lecture) {
            return Err(GameError::Unavailable {
                mode,
                lecture: lecture.id,
            });
        }
        let entries = lecture.glossary.clone();
        let board = GameBoard::build(mode, &entries, &mut rng);
        tracing::debug!(lecture = lecture.id, mode = mode.label(), "game started");
        Ok(Self {
            lecture_id: lecture.id,
            mode,
            entries,
            board,
            score: ScoreBoard::default(),
            won: false,
            rng,
        })
    }

    pub fn lecture_id(&self) -> u32 {
        self.lecture_id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score.points()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn apply(&mut self, action: GameAction) -> Outcome {
        if self.won {
            return Outcome::Ignored;
        }
        let outcome = self.board.game_mut().apply(action, &mut self.score);
        if self.board.game().is_won() {
            self.won = true;
            tracing::info!(
                lecture = self.lecture_id,
                mode = self.mode.label(),
                score = self.score.points(),
                "game won"
            );
        }
        outcome
    }

    /// Same mode, same lecture, fresh board and zero score.
    pub fn restart(&mut self) {
        self.board = GameBoard::build(self.mode, &self.entries, &mut self.rng);
        self.score.reset();
        self.won = false;
    }
}
