use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::scoring::{SEQUENCING_PENALTY, SEQUENCING_REWARD, ScoreBoard};
use crate::session::games::{GameAction, MiniGame, Outcome};

const LEVELS: [(&str, u8); 5] = [
    ("الحاجات الفسيولوجية (قاعدة الهرم)", 1),
    ("حاجات الأمن والأمان", 2),
    ("الحب والانتماء", 3),
    ("تقدير الذات", 4),
    ("تحقيق الذات (قمة الهرم)", 5),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub text: &'static str,
    pub order: u8,
}

/// Maslow's hierarchy, rebuilt bottom-up from a shuffled pool.
pub struct Sequencing {
    pool: Vec<Level>,
    built: Vec<Level>,
}

impl Sequencing {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut pool: Vec<Level> = LEVELS
            .iter()
            .map(|&(text, order)| Level { text, order })
            .collect();
        pool.shuffle(rng);
        Self {
            pool,
            built: Vec::new(),
        }
    }

    pub fn pool(&self) -> &[Level] {
        &self.pool
    }

    pub fn built(&self) -> &[Level] {
        &self.built
    }

    fn expected_order(&self) -> u8 {
        self.built.last().map_or(1, |l| l.order + 1)
    }

    fn pick(&mut self, index: usize, score: &mut ScoreBoard) -> Outcome {
        let Some(level) = self.pool.get(index) else {
            return Outcome::Ignored;
        };
        if level.order == self.expected_order() {
            let level = self.pool.remove(index);
            self.built.push(level);
            score.reward(SEQUENCING_REWARD);
            Outcome::Correct
        } else {
            score.penalize(SEQUENCING_PENALTY);
            Outcome::Wrong
        }
    }
}

impl MiniGame for Sequencing {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome {
        match action {
            GameAction::Select(index) => self.pick(index, score),
            _ => Outcome::Ignored,
        }
    }

    fn is_won(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::games::tests::rng;

    fn index_of(game: &Sequencing, order: u8) -> usize {
        game.pool().iter().position(|l| l.order == order).unwrap()
    }

    #[test]
    fn ascending_picks_build_the_pyramid() {
        let mut game = Sequencing::new(&mut rng());
        let mut score = ScoreBoard::default();
        for order in 1..=5 {
            let i = index_of(&game, order);
            assert_eq!(game.apply(GameAction::Select(i), &mut score), Outcome::Correct);
        }
        assert!(game.is_won());
        let orders: Vec<u8> = game.built().iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert_eq!(score.points(), 5 * SEQUENCING_REWARD);
    }

    #[test]
    fn out_of_order_pick_penalizes_and_leaves_pool() {
        let mut game = Sequencing::new(&mut rng());
        let mut score = ScoreBoard::default();
        let base = index_of(&game, 1);
        game.apply(GameAction::Select(base), &mut score);

        let top = index_of(&game, 5);
        let pool_before = game.pool().to_vec();
        assert_eq!(game.apply(GameAction::Select(top), &mut score), Outcome::Wrong);
        assert_eq!(game.pool(), pool_before.as_slice());
        assert_eq!(score.points(), SEQUENCING_REWARD - SEQUENCING_PENALTY);

        for _ in 0..5 {
            game.apply(GameAction::Select(index_of(&game, 5)), &mut score);
        }
        assert_eq!(score.points(), 0);
    }
}
