use std::collections::HashSet;

use icu_normalizer::ComposingNormalizerBorrowed;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::GlossaryEntry;
use crate::engine::scoring::{SCRAMBLE_PENALTY, SCRAMBLE_REWARD, ScoreBoard};
use crate::session::games::{GameAction, MiniGame, Outcome};

const HINT_CHARS: usize = 50;
const SHUFFLE_ATTEMPTS: usize = 8;

fn nfc(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text)
        .into_owned()
}

fn scramble(term: &str, rng: &mut impl Rng) -> String {
    let original: Vec<char> = term.chars().collect();
    let distinct: HashSet<char> = original.iter().copied().collect();
    let mut letters = original.clone();
    letters.shuffle(rng);
    if distinct.len() < 2 {
        return letters.into_iter().collect();
    }
    for _ in 0..SHUFFLE_ATTEMPTS {
        if letters != original {
            return letters.into_iter().collect();
        }
        letters.shuffle(rng);
    }
    // A one-step rotation differs whenever two distinct letters exist.
    letters.rotate_left(1);
    letters.into_iter().collect()
}

pub struct Scramble {
    answer: String,
    scrambled: String,
    hint: String,
    attempts: u32,
    solved: bool,
}

impl Scramble {
    pub fn new(entries: &[GlossaryEntry], rng: &mut impl Rng) -> Self {
        let (answer, definition) = entries
            .choose(rng)
            .map(|e| (e.term.clone(), e.definition.as_str()))
            .unwrap_or_default();

        let mut hint: String = definition.chars().take(HINT_CHARS).collect();
        if definition.chars().count() > HINT_CHARS {
            hint.push('…');
        }
        let scrambled = scramble(&answer, rng);

        Self {
            answer,
            scrambled,
            hint,
            attempts: 0,
            solved: false,
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn scrambled(&self) -> &str {
        &self.scrambled
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn guess(&mut self, guess: &str, score: &mut ScoreBoard) -> Outcome {
        if self.solved || self.answer.is_empty() {
            return Outcome::Ignored;
        }
        self.attempts += 1;
        if nfc(guess.trim()) == nfc(self.answer.trim()) {
            self.solved = true;
            score.reward(SCRAMBLE_REWARD);
            Outcome::Correct
        } else {
            score.penalize(SCRAMBLE_PENALTY);
            Outcome::Wrong
        }
    }
}

impl MiniGame for Scramble {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome {
        match action {
            GameAction::Guess(text) => self.guess(&text, score),
            _ => Outcome::Ignored,
        }
    }

    fn is_won(&self) -> bool {
        self.solved
    }
}
