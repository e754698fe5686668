use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::GlossaryEntry;
use crate::engine::scoring::{ScoreBoard, TRUE_FALSE_REWARD};
use crate::session::games::{GameAction, MiniGame, Outcome};

pub const COUNTDOWN_TICKS: u8 = 10;
pub const FEEDBACK_TICKS: u8 = 2;
const TRUE_PROBABILITY: f64 = 0.7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub term: String,
    /// The definition shown to the player, which may belong to another term.
    pub claim: String,
    pub is_true: bool,
    /// The term's real definition, shown as feedback.
    pub definition: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Asking { remaining: u8 },
    Feedback { correct: bool, remaining: u8 },
    Finished,
}

pub struct TrueFalse {
    statements: Vec<Statement>,
    index: usize,
    phase: Phase,
}

impl TrueFalse {
    pub fn new(entries: &[GlossaryEntry], rng: &mut impl Rng) -> Self {
        let mut statements: Vec<Statement> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut claim = entry.definition.clone();
                if entries.len() > 1 && !rng.gen_bool(TRUE_PROBABILITY) {
                    let mut other = rng.gen_range(0..entries.len() - 1);
                    if other >= i {
                        other += 1;
                    }
                    claim = entries[other].definition.clone();
                }
                Statement {
                    term: entry.term.clone(),
                    is_true: claim == entry.definition,
                    claim,
                    definition: entry.definition.clone(),
                }
            })
            .collect();
        statements.shuffle(rng);

        let phase = if statements.is_empty() {
            Phase::Finished
        } else {
            Phase::Asking {
                remaining: COUNTDOWN_TICKS,
            }
        };
        Self {
            statements,
            index: 0,
            phase,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn current(&self) -> Option<&Statement> {
        match self.phase {
            Phase::Finished => None,
            _ => self.statements.get(self.index),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn judge(&mut self, answer: bool, score: &mut ScoreBoard) -> Outcome {
        let correct = self
            .statements
            .get(self.index)
            .is_some_and(|s| s.is_true == answer);
        if correct {
            score.reward(TRUE_FALSE_REWARD);
        }
        self.phase = Phase::Feedback {
            correct,
            remaining: FEEDBACK_TICKS,
        };
        if correct { Outcome::Correct } else { Outcome::Wrong }
    }

    fn tick(&mut self, score: &mut ScoreBoard) -> Outcome {
        match self.phase {
            Phase::Asking { remaining } if remaining <= 1 => self.judge(false, score),
            Phase::Asking { remaining } => {
                self.phase = Phase::Asking {
                    remaining: remaining - 1,
                };
                Outcome::Progress
            }
            Phase::Feedback { remaining, .. } if remaining <= 1 => {
                self.index += 1;
                self.phase = if self.index >= self.statements.len() {
                    Phase::Finished
                } else {
                    Phase::Asking {
                        remaining: COUNTDOWN_TICKS,
                    }
                };
                Outcome::Progress
            }
            Phase::Feedback { correct, remaining } => {
                self.phase = Phase::Feedback {
                    correct,
                    remaining: remaining - 1,
                };
                Outcome::Progress
            }
            Phase::Finished => Outcome::Ignored,
        }
    }
}

impl MiniGame for TrueFalse {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome {
        match action {
            GameAction::Answer(answer) if matches!(self.phase, Phase::Asking { .. }) => {
                self.judge(answer, score)
            }
            GameAction::Tick => self.tick(score),
            _ => Outcome::Ignored,
        }
    }

    fn is_won(&self) -> bool {
        self.phase == Phase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::content::fixtures::entry;
    use crate::session::games::tests::{rng, sample_entries};

    fn ticks(game: &mut TrueFalse, score: &mut ScoreBoard, n: u8) {
        for _ in 0..n {
            game.apply(GameAction::Tick, score);
        }
    }

    #[test]
    fn one_statement_per_entry_and_labels_are_consistent() {
        let game = TrueFalse::new(&sample_entries(), &mut rng());
        assert_eq!(game.statements().len(), 4);
        for s in game.statements() {
            assert_eq!(s.is_true, s.claim == s.definition);
        }
    }

    #[test]
    fn single_entry_statement_is_true() {
        let game = TrueFalse::new(&[entry("الهو", None, "غرائز")], &mut rng());
        assert!(game.statements()[0].is_true);
    }

    #[test]
    fn timeout_scores_like_explicit_false() {
        let entries = sample_entries();
        for seed in 0..20 {
            let mut timed = TrueFalse::new(&entries, &mut SmallRng::seed_from_u64(seed));
            let mut answered = TrueFalse::new(&entries, &mut SmallRng::seed_from_u64(seed));
            let (mut s1, mut s2) = (ScoreBoard::default(), ScoreBoard::default());

            ticks(&mut timed, &mut s1, COUNTDOWN_TICKS);
            answered.apply(GameAction::Answer(false), &mut s2);

            assert_eq!(s1, s2);
            assert_eq!(timed.phase(), answered.phase());
        }
    }

    #[test]
    fn answers_are_ignored_during_feedback() {
        let mut game = TrueFalse::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        game.apply(GameAction::Answer(true), &mut score);
        let before = score;
        assert_eq!(game.apply(GameAction::Answer(true), &mut score), Outcome::Ignored);
        assert_eq!(score, before);
    }

    #[test]
    fn feedback_advances_and_game_finishes() {
        let mut game = TrueFalse::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        let mut correct = 0;
        while !game.is_won() {
            let truth = game.current().unwrap().is_true;
            assert_eq!(game.apply(GameAction::Answer(truth), &mut score), Outcome::Correct);
            correct += 1;
            ticks(&mut game, &mut score, FEEDBACK_TICKS);
        }
        assert_eq!(correct, 4);
        assert_eq!(score.points(), 4 * TRUE_FALSE_REWARD);
        assert_eq!(game.apply(GameAction::Tick, &mut score), Outcome::Ignored);
    }
}
