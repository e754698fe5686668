pub mod glossary;
pub mod progress;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SYLLABUS_JSON: &str = include_str!("../../assets/syllabus.json");
const QUIZ_JSON: &str = include_str!("../../assets/quiz.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Direct definitions and core concepts",
            Difficulty::Medium => "Concepts applied to realistic cases",
            Difficulty::Hard => "Careful analysis of psychic dynamics",
            Difficulty::Expert => "Integrating several theories at once",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    #[serde(default)]
    pub term_en: Option<String>,
    pub definition: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LectureRecord {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub text: String,
    pub goals: Vec<String>,
    pub key_concepts: Vec<String>,
    pub glossary: Vec<GlossaryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Filled in from the enclosing lecture block when the bundle is loaded.
    #[serde(default)]
    pub lecture_id: u32,
    pub difficulty: Difficulty,
    pub scenario: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Deserialize)]
struct LectureQuiz {
    lecture_id: u32,
    questions: Vec<QuizQuestion>,
}

/// Read-only catalog of lectures, glossary terms and quiz questions.
pub struct ContentStore {
    lectures: Vec<LectureRecord>,
    questions: Vec<QuizQuestion>,
}

impl ContentStore {
    /// Parse the bundled syllabus and quiz bank.
    pub fn load() -> Result<Self> {
        let lectures: Vec<LectureRecord> =
            serde_json::from_str(SYLLABUS_JSON).context("parsing bundled syllabus")?;
        let quizzes: Vec<LectureQuiz> =
            serde_json::from_str(QUIZ_JSON).context("parsing bundled quiz bank")?;

        let questions = quizzes
            .into_iter()
            .flat_map(|quiz| {
                let lecture_id = quiz.lecture_id;
                quiz.questions.into_iter().map(move |mut q| {
                    q.lecture_id = lecture_id;
                    q
                })
            })
            .collect();

        Ok(Self::from_parts(lectures, questions))
    }

    pub fn from_parts(mut lectures: Vec<LectureRecord>, questions: Vec<QuizQuestion>) -> Self {
        lectures.sort_by_key(|l| l.id);
        Self {
            lectures,
            questions,
        }
    }

    pub fn lectures(&self) -> &[LectureRecord] {
        &self.lectures
    }

    pub fn lecture(&self, id: u32) -> Option<&LectureRecord> {
        self.lectures.iter().find(|l| l.id == id)
    }

    pub fn lecture_questions(&self, lecture_id: u32) -> impl Iterator<Item = &QuizQuestion> {
        self.questions
            .iter()
            .filter(move |q| q.lecture_id == lecture_id)
    }

    /// The question pool for one (lecture, difficulty) pair, in bank order.
    pub fn questions(&self, lecture_id: u32, difficulty: Difficulty) -> Vec<QuizQuestion> {
        self.lecture_questions(lecture_id)
            .filter(|q| q.difficulty == difficulty)
            .cloned()
            .collect()
    }

    /// Every glossary entry of every lecture, tagged with its lecture id.
    pub fn all_terms(&self) -> impl Iterator<Item = (u32, &GlossaryEntry)> {
        self.lectures
            .iter()
            .flat_map(|l| l.glossary.iter().map(move |g| (l.id, g)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn entry(term: &str, term_en: Option<&str>, definition: &str) -> GlossaryEntry {
        GlossaryEntry {
            term: term.to_string(),
            term_en: term_en.map(str::to_string),
            definition: definition.to_string(),
        }
    }

    pub fn lecture(id: u32, glossary: Vec<GlossaryEntry>) -> LectureRecord {
        LectureRecord {
            id,
            title: format!("Lecture {id}"),
            description: String::new(),
            text: String::new(),
            goals: Vec::new(),
            key_concepts: Vec::new(),
            glossary,
        }
    }

    pub fn question(lecture_id: u32, difficulty: Difficulty, correct_answer: usize) -> QuizQuestion {
        QuizQuestion {
            lecture_id,
            difficulty,
            scenario: format!("scenario {lecture_id}/{}", difficulty.as_str()),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer,
            explanation: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_content_loads() {
        let store = ContentStore::load().unwrap();
        assert!(!store.lectures().is_empty());
        assert!(store.lecture(1).is_some());
        for q in store.lecture_questions(1) {
            assert!(q.correct_answer < q.options.len());
        }
    }

    #[test]
    fn lecture_one_easy_has_three_questions() {
        let store = ContentStore::load().unwrap();
        assert_eq!(store.questions(1, Difficulty::Easy).len(), 3);
    }

    #[test]
    fn every_bundled_question_belongs_to_a_lecture() {
        let store = ContentStore::load().unwrap();
        for lecture in store.lectures() {
            for q in store.lecture_questions(lecture.id) {
                assert_eq!(q.lecture_id, lecture.id);
            }
        }
        let total: usize = store
            .lectures()
            .iter()
            .map(|l| store.lecture_questions(l.id).count())
            .sum();
        assert_eq!(total, store.questions.len());
    }

    #[test]
    fn question_pool_is_filtered_subset() {
        let store = ContentStore::load().unwrap();
        for lecture in store.lectures() {
            let all: Vec<&QuizQuestion> = store.lecture_questions(lecture.id).collect();
            for difficulty in Difficulty::ALL {
                let pool = store.questions(lecture.id, difficulty);
                let expected = all.iter().filter(|q| q.difficulty == difficulty).count();
                assert_eq!(pool.len(), expected);
                assert!(pool.iter().all(|q| all.contains(&q)));
            }
        }
    }

    #[test]
    fn difficulty_levels_are_ordered() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Hard < Difficulty::Expert);
    }
}
