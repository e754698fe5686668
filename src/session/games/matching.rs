use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::GlossaryEntry;
use crate::engine::scoring::{MATCH_REWARD, ScoreBoard};
use crate::session::games::{GameAction, MiniGame, Outcome};

const PAIR_COUNT: usize = 6;
const DEFINITION_CHARS: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Term,
    Definition,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Cards with the same key belong to the same glossary entry.
    pub key: usize,
    pub kind: CardKind,
    pub text: String,
}

pub struct Matching {
    cards: Vec<Card>,
    matched: Vec<bool>,
    pending: Option<usize>,
}

fn definition_face(entry: &GlossaryEntry) -> String {
    if let Some(en) = entry.term_en.as_deref().filter(|s| !s.is_empty()) {
        return en.to_string();
    }
    let mut short: String = entry.definition.chars().take(DEFINITION_CHARS).collect();
    if entry.definition.chars().count() > DEFINITION_CHARS {
        short.push('…');
    }
    short
}

impl Matching {
    pub fn new(entries: &[GlossaryEntry], rng: &mut impl Rng) -> Self {
        let mut cards: Vec<Card> = entries
            .iter()
            .take(PAIR_COUNT)
            .enumerate()
            .flat_map(|(key, entry)| {
                [
                    Card {
                        key,
                        kind: CardKind::Term,
                        text: entry.term.clone(),
                    },
                    Card {
                        key,
                        kind: CardKind::Definition,
                        text: definition_face(entry),
                    },
                ]
            })
            .collect();
        cards.shuffle(rng);
        let matched = vec![false; cards.len()];
        Self {
            cards,
            matched,
            pending: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.get(index).copied().unwrap_or(false)
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn matched_count(&self) -> usize {
        self.matched.iter().filter(|m| **m).count()
    }

    fn select(&mut self, index: usize, score: &mut ScoreBoard) -> Outcome {
        if index >= self.cards.len() || self.matched[index] {
            return Outcome::Ignored;
        }
        let Some(first) = self.pending else {
            self.pending = Some(index);
            return Outcome::Progress;
        };
        if first == index {
            self.pending = None;
            return Outcome::Progress;
        }

        let (a, b) = (&self.cards[first], &self.cards[index]);
        if a.key == b.key && a.kind != b.kind {
            self.matched[first] = true;
            self.matched[index] = true;
            self.pending = None;
            score.reward(MATCH_REWARD);
            Outcome::Correct
        } else {
            self.pending = Some(index);
            Outcome::Progress
        }
    }
}

impl MiniGame for Matching {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome {
        match action {
            GameAction::Select(index) => self.select(index, score),
            _ => Outcome::Ignored,
        }
    }

    fn is_won(&self) -> bool {
        self.matched_count() == self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::entry;
    use crate::session::games::tests::{rng, sample_entries};

    fn partner(game: &Matching, index: usize) -> usize {
        let card = &game.cards()[index];
        game.cards()
            .iter()
            .position(|c| c.key == card.key && c.kind != card.kind)
            .unwrap()
    }

    #[test]
    fn two_cards_per_entry_capped_at_six_pairs() {
        let entries: Vec<_> = (0..9)
            .map(|i| entry(&format!("t{i}"), None, "d"))
            .collect();
        let game = Matching::new(&entries, &mut rng());
        assert_eq!(game.cards().len(), 12);
        assert_eq!(Matching::new(&sample_entries(), &mut rng()).cards().len(), 8);
    }

    #[test]
    fn definition_face_prefers_gloss_then_truncates() {
        let long = "x".repeat(60);
        let entries = vec![entry("a", Some("Alpha"), "short"), entry("b", None, &long)];
        let game = Matching::new(&entries, &mut rng());
        let faces: Vec<&str> = game
            .cards()
            .iter()
            .filter(|c| c.kind == CardKind::Definition)
            .map(|c| c.text.as_str())
            .collect();
        assert!(faces.contains(&"Alpha"));
        assert!(faces.iter().any(|f| f.chars().count() == DEFINITION_CHARS + 1));
    }

    #[test]
    fn matching_pair_scores_and_wins_when_all_matched() {
        let mut game = Matching::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        while !game.is_won() {
            let first = (0..game.cards().len())
                .find(|i| !game.is_matched(*i))
                .unwrap();
            let second = partner(&game, first);
            assert_eq!(game.apply(GameAction::Select(first), &mut score), Outcome::Progress);
            assert_eq!(game.apply(GameAction::Select(second), &mut score), Outcome::Correct);
            assert_eq!(game.cards()[first].key, game.cards()[second].key);
            assert_ne!(game.cards()[first].kind, game.cards()[second].kind);
        }
        assert_eq!(score.points(), 4 * MATCH_REWARD);
    }

    #[test]
    fn reselecting_pending_clears_it() {
        let mut game = Matching::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        game.apply(GameAction::Select(0), &mut score);
        game.apply(GameAction::Select(0), &mut score);
        assert_eq!(game.pending(), None);
    }

    #[test]
    fn mismatch_replaces_pending_without_penalty() {
        let mut game = Matching::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        let first = 0;
        let wrong = (1..game.cards().len())
            .find(|i| game.cards()[*i].key != game.cards()[first].key)
            .unwrap();
        game.apply(GameAction::Select(first), &mut score);
        assert_eq!(game.apply(GameAction::Select(wrong), &mut score), Outcome::Progress);
        assert_eq!(game.pending(), Some(wrong));
        assert_eq!(score.points(), 0);
        assert!(!game.is_won());
    }

    #[test]
    fn matched_cards_are_ignored() {
        let mut game = Matching::new(&sample_entries(), &mut rng());
        let mut score = ScoreBoard::default();
        let second = partner(&game, 0);
        game.apply(GameAction::Select(0), &mut score);
        game.apply(GameAction::Select(second), &mut score);
        assert_eq!(game.apply(GameAction::Select(0), &mut score), Outcome::Ignored);
        assert_eq!(game.pending(), None);
        assert_eq!(game.apply(GameAction::Select(99), &mut score), Outcome::Ignored);
    }
}
