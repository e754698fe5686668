use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::scoring::{SORTING_PENALTY, SORTING_REWARD, ScoreBoard};
use crate::session::games::{GameAction, MiniGame, Outcome};

/// Category labels, indexed by [`GameAction::Assign`].
pub const CATEGORIES: [&str; 3] = ["الهو", "الأنا", "الأنا الأعلى"];

const ITEMS: [(&str, usize); 6] = [
    ("يطلب الإشباع الفوري للرغبات والغرائز", 0),
    ("يعمل وفق مبدأ الواقع وينسق بين مكونات الشخصية", 1),
    ("يحمل الضمير والقيم الأخلاقية العليا", 2),
    ("يمثل الجانب الفطري البدائي من النفس", 0),
    ("يوازن بين ضغوط الواقع ومطالب الغرائز", 1),
    ("يقوم بدور الرقيب الداخلي والمثال الاجتماعي", 2),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortItem {
    pub text: &'static str,
    pub category: usize,
}

/// The current item is always the head of the pool.
pub struct Sorting {
    pool: Vec<SortItem>,
}

impl Sorting {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut pool: Vec<SortItem> = ITEMS
            .iter()
            .map(|&(text, category)| SortItem { text, category })
            .collect();
        pool.shuffle(rng);
        Self { pool }
    }

    pub fn current(&self) -> Option<&SortItem> {
        self.pool.first()
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn total() -> usize {
        ITEMS.len()
    }

    fn assign(&mut self, category: usize, score: &mut ScoreBoard) -> Outcome {
        if category >= CATEGORIES.len() {
            return Outcome::Ignored;
        }
        let Some(item) = self.pool.first() else {
            return Outcome::Ignored;
        };
        if item.category == category {
            self.pool.remove(0);
            score.reward(SORTING_REWARD);
            Outcome::Correct
        } else {
            score.penalize(SORTING_PENALTY);
            Outcome::Wrong
        }
    }
}

impl MiniGame for Sorting {
    fn apply(&mut self, action: GameAction, score: &mut ScoreBoard) -> Outcome {
        match action {
            GameAction::Assign(category) => self.assign(category, score),
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

    #[test]
    fn wrong_category_keeps_item_and_floors_score() {
        let mut game = Sorting::new(&mut rng());
        let mut score = ScoreBoard::default();
        let item = game.current().unwrap().clone();
        let wrong = (item.category + 1) % CATEGORIES.len();

        assert_eq!(game.apply(GameAction::Assign(wrong), &mut score), Outcome::Wrong);
        assert_eq!(score.points(), 0);
        assert_eq!(game.current(), Some(&item));
        assert_eq!(game.remaining(), Sorting::total());
    }

    #[test]
    fn penalty_is_fixed_after_a_reward() {
        let mut game = Sorting::new(&mut rng());
        let mut score = ScoreBoard::default();
        let right = game.current().unwrap().category;
        game.apply(GameAction::Assign(right), &mut score);
        let wrong = (game.current().unwrap().category + 1) % CATEGORIES.len();
        game.apply(GameAction::Assign(wrong), &mut score);
        assert_eq!(score.points(), SORTING_REWARD - SORTING_PENALTY);
    }

    #[test]
    fn sorting_everything_wins() {
        let mut game = Sorting::new(&mut rng());
        let mut score = ScoreBoard::default();
        while let Some(item) = game.current() {
            let category = item.category;
            game.apply(GameAction::Assign(category), &mut score);
        }
        assert!(game.is_won());
        assert_eq!(score.points(), 6 * SORTING_REWARD);
        assert_eq!(game.apply(GameAction::Assign(0), &mut score), Outcome::Ignored);
    }

    #[test]
    fn out_of_range_category_is_ignored() {
        let mut game = Sorting::new(&mut rng());
        let mut score = ScoreBoard::default();
        assert_eq!(game.apply(GameAction::Assign(3), &mut score), Outcome::Ignored);
    }
}
