use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use dynapsy::content::glossary::{GlossaryFilter, GlossaryManager};
use dynapsy::content::progress::ProgressTracker;
use dynapsy::content::{ContentStore, Difficulty};
use dynapsy::engine::scoring::{SEQUENCING_REWARD, SORTING_REWARD};
use dynapsy::session::games::{GameAction, GameBoard, GameMode, GameSession, Outcome};
use dynapsy::session::quiz::{QuizEngine, QuizState};
use dynapsy::store::json_store::JsonStore;
use dynapsy::store::repository::JsonRepository;
use dynapsy::store::schema::{COMPLETED_LECTURES_KEY, CUSTOM_TERMS_KEY};

fn open_store(dir: &TempDir) -> JsonStore {
    JsonStore::with_base_dir(dir.path().join("data")).unwrap()
}

fn progress(store: &JsonStore) -> ProgressTracker {
    ProgressTracker::new(Box::new(JsonRepository::new(
        store.clone(),
        COMPLETED_LECTURES_KEY,
    )))
}

fn glossary(content: &ContentStore, store: &JsonStore) -> GlossaryManager {
    GlossaryManager::new(
        content,
        Box::new(JsonRepository::new(store.clone(), CUSTOM_TERMS_KEY)),
    )
}

#[test]
fn studied_lectures_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let content = ContentStore::load().unwrap();
    let ids: Vec<u32> = content.lectures().iter().map(|l| l.id).collect();

    {
        let store = open_store(&dir);
        let mut tracker = progress(&store);
        assert!(tracker.toggle(2).unwrap());
        assert!(tracker.toggle(5).unwrap());
        assert!(!tracker.toggle(5).unwrap());
    }

    let store = open_store(&dir);
    let tracker = progress(&store);
    assert!(tracker.is_completed(2));
    assert!(!tracker.is_completed(5));
    assert_eq!(tracker.completed_count(), 1);
    assert!((tracker.ratio(&ids) - 1.0 / ids.len() as f64).abs() < 1e-9);
}

#[test]
fn custom_terms_survive_reopen_and_merge_with_catalog() {
    let dir = TempDir::new().unwrap();
    let content = ContentStore::load().unwrap();
    let catalog_size = content.all_terms().count();

    let id = {
        let store = open_store(&dir);
        let mut manager = glossary(&content, &store);
        manager
            .add("  التقمص ", "Identification", "تبني الفرد لصفات شخص آخر")
            .unwrap()
            .id
            .clone()
    };

    let store = open_store(&dir);
    let mut manager = glossary(&content, &store);
    assert_eq!(manager.search("", GlossaryFilter::All).len(), catalog_size + 1);

    let mine = manager.search("identif", GlossaryFilter::Custom);
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].term, "التقمص");

    assert!(manager.delete(&id).unwrap());
    let manager = glossary(&content, &open_store(&dir));
    assert!(manager.custom_terms().is_empty());
}

#[test]
fn easy_quiz_on_first_lecture_scores_full_marks() {
    let content = Arc::new(ContentStore::load().unwrap());
    let mut quiz = QuizEngine::new(Arc::clone(&content));

    quiz.choose_lecture(1).unwrap();
    assert_eq!(quiz.choose_difficulty(Difficulty::Easy).unwrap(), QuizState::Answering);
    assert_eq!(quiz.total(), 3);

    loop {
        let correct = quiz.current_question().unwrap().correct_answer;
        quiz.select_option(correct).unwrap();
        assert!(quiz.submit().unwrap());
        if quiz.state() == QuizState::Completed {
            break;
        }
        quiz.next_question().unwrap();
    }
    assert_eq!(quiz.result(), Some((3, 3)));

    quiz.change_difficulty().unwrap();
    assert_eq!(quiz.choose_difficulty(Difficulty::Expert).unwrap(), QuizState::Empty);
}

#[test]
fn psyche_sorting_is_won_by_filing_every_item_correctly() {
    let content = ContentStore::load().unwrap();
    let lecture = content.lecture(1).unwrap();
    let mut game =
        GameSession::start_with_rng(lecture, GameMode::Sorting, SmallRng::seed_from_u64(11)).unwrap();

    let mut filed = 0;
    while !game.is_won() {
        let GameBoard::Sorting(board) = game.board() else {
            panic!("expected a sorting board");
        };
        let category = board.current().unwrap().category;
        assert_eq!(game.apply(GameAction::Assign(category)), Outcome::Correct);
        filed += 1;
    }
    assert_eq!(filed, 6);
    assert_eq!(game.score(), 6 * SORTING_REWARD);
    assert_eq!(game.apply(GameAction::Assign(0)), Outcome::Ignored);
}

#[test]
fn hierarchy_game_only_runs_for_its_lecture() {
    let content = ContentStore::load().unwrap();
    assert!(GameSession::start(content.lecture(1).unwrap(), GameMode::Sequencing).is_err());

    let mut game = GameSession::start_with_rng(
        content.lecture(4).unwrap(),
        GameMode::Sequencing,
        SmallRng::seed_from_u64(3),
    )
    .unwrap();
    for order in 1..=5u8 {
        let GameBoard::Sequencing(board) = game.board() else {
            panic!("expected a sequencing board");
        };
        let index = board.pool().iter().position(|l| l.order == order).unwrap();
        assert_eq!(game.apply(GameAction::Select(index)), Outcome::Correct);
    }
    assert!(game.is_won());
    assert_eq!(game.score(), 5 * SEQUENCING_REWARD);
}
