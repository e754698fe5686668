pub const MATCH_REWARD: u32 = 15;
pub const TRUE_FALSE_REWARD: u32 = 20;
pub const SORTING_REWARD: u32 = 10;
pub const SORTING_PENALTY: u32 = 5;
pub const SEQUENCING_REWARD: u32 = 25;
pub const SEQUENCING_PENALTY: u32 = 10;
pub const SCRAMBLE_REWARD: u32 = 50;
pub const SCRAMBLE_PENALTY: u32 = 15;

/// Per-session score accumulator. Never drops below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    points: u32,
}

impl ScoreBoard {
    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn reward(&mut self, amount: u32) {
        self.points = self.points.saturating_add(amount);
    }

    pub fn penalize(&mut self, amount: u32) {
        self.points = self.points.saturating_sub(amount);
    }

    pub fn reset(&mut self) {
        self.points = 0;
    }
}

/// Quiz percentage, rounded down. Zero for an empty quiz.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct * 100 / total) as u32
}

pub fn grade_label(correct: usize, total: usize) -> &'static str {
    match percentage(correct, total) {
        90.. => "Excellent",
        70..=89 => "Good",
        50..=69 => "Pass",
        _ => "Needs review",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_floors_at_zero() {
        let mut score = ScoreBoard::default();
        score.penalize(SCRAMBLE_PENALTY);
        assert_eq!(score.points(), 0);
        score.reward(SORTING_REWARD);
        score.penalize(SORTING_PENALTY);
        score.penalize(SORTING_PENALTY);
        score.penalize(SORTING_PENALTY);
        assert_eq!(score.points(), 0);
    }

    #[test]
    fn test_reset_clears_points() {
        let mut score = ScoreBoard::default();
        score.reward(MATCH_REWARD);
        score.reset();
        assert_eq!(score, ScoreBoard::default());
    }

    #[test]
    fn test_percentage_and_grade() {
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(grade_label(3, 3), "Excellent");
        assert_eq!(grade_label(1, 3), "Needs review");
    }
}
